// errors.rs
use crate::mailer::MailerError;
use crate::notify::{NotifyError, StoreError};
use crate::scraper::{QueryError, ScraperError};
use thiserror::Error;

/// Errors that end the process: bad configuration at startup, or a notifier
/// that gave up.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    Scraper(#[from] ScraperError),
    #[error(transparent)]
    Mailer(#[from] MailerError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
}
