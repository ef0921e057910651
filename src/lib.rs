//! Scraper and new-listing notifier for KSL Classifieds.

pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod mailer;
pub mod notify;
pub mod scraper;

#[cfg(test)]
mod tests;
