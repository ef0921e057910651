// src/notify/notifier.rs

use crate::config::NotifyConfig;
use crate::mailer::{
    failure_body, match_header, match_subject, Email, MailTransport, FAILURE_SUBJECT,
};
use crate::notify::batch::{batch, filter_new, BatchLayout, MessageBatch};
use crate::notify::failure::{Escalation, FailureCounter, FailureKind};
use crate::notify::seen::SeenStore;
use crate::scraper::{build_query_urls, find_listings, Fetcher, KslScraper, QueryError};
use chrono::{Local, NaiveDate};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Too many failures ({failures}), terminating. Last error: {last_error}")]
    TooManyFailures { failures: u32, last_error: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CycleFailure {
    pub kind: FailureKind,
    pub message: String,
}

/// What happened during one fetch → deliver → persist pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    pub emails_sent: usize,
    pub failures: Vec<CycleFailure>,
}

impl CycleReport {
    fn fail(&mut self, kind: FailureKind, message: String) {
        self.failures.push(CycleFailure { kind, message });
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// `Timeout` only when every failure was a timeout.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        if self.failures.is_empty() {
            None
        } else if self.failures.iter().all(|f| f.kind == FailureKind::Timeout) {
            Some(FailureKind::Timeout)
        } else {
            Some(FailureKind::Error)
        }
    }

    pub fn summary(&self) -> String {
        self.failures
            .iter()
            .map(|f| f.message.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A batch waiting for delivery, with the query whose seen list it updates.
struct Outgoing {
    query: String,
    batch: MessageBatch,
    email: Email,
}

pub struct Notifier<'a, F: Fetcher, T: MailTransport + ?Sized> {
    scraper: KslScraper<F>,
    transport: &'a T,
    config: NotifyConfig,
    targets: Vec<(String, String)>,
    seen: SeenStore,
    failures: FailureCounter,
    last_seen_log: Option<NaiveDate>,
}

impl<'a, F: Fetcher, T: MailTransport + ?Sized> Notifier<'a, F, T> {
    /// Builds every search URL up front, so bad filters fail before any fetch.
    pub fn new(
        fetcher: F,
        transport: &'a T,
        config: NotifyConfig,
        seen: SeenStore,
    ) -> Result<Self, QueryError> {
        let targets = build_query_urls(&config.search.terms, &config.search.filters)?;
        let scraper = KslScraper::new(fetcher, config.search.workers, config.search.timeout);
        let failures = FailureCounter::new(config.repeated_failures);

        Ok(Self {
            scraper,
            transport,
            config,
            targets,
            seen,
            failures,
            last_seen_log: None,
        })
    }

    pub fn seen(&self) -> &SeenStore {
        &self.seen
    }

    pub fn failures(&self) -> &FailureCounter {
        &self.failures
    }

    /// Runs cycles until failures pile up past the abort bound.
    pub fn run(&mut self) -> Result<(), NotifyError> {
        loop {
            self.step()?;
            tracing::debug!("Sleeping {:?}", self.config.interval);
            std::thread::sleep(self.config.interval);
        }
    }

    /// One cycle plus failure accounting.
    pub fn step(&mut self) -> Result<CycleReport, NotifyError> {
        let report = self.run_cycle();
        self.log_seen_daily();
        self.account(&report)?;
        Ok(report)
    }

    pub fn run_cycle(&mut self) -> CycleReport {
        let mut report = CycleReport::default();
        let time = Local::now().format("%H:%M").to_string();

        tracing::info!("Checking {} searches", self.targets.len());
        let pages = self.scraper.search(&self.targets);

        let mut outgoing = Vec::new();
        for page in pages {
            self.seen.track(&page.query);

            let body = match page.body {
                Ok(body) => body,
                Err(e) => {
                    let kind = if e.is_timeout() {
                        tracing::debug!("Socket timeout for '{}'", page.query);
                        FailureKind::Timeout
                    } else {
                        FailureKind::Error
                    };
                    report.fail(kind, format!("Fetch for '{}' failed: {e}", page.query));
                    continue;
                }
            };

            let html = String::from_utf8_lossy(&body);
            let listings = find_listings(&html);
            let queued = self.prepare(&page.query, &listings, &time);

            if queued.is_empty() {
                tracing::info!("No new search results found for '{}'. No email sent.", page.query);
            }
            outgoing.extend(queued);
        }

        self.deliver(outgoing, &mut report);
        self.persist(&mut report);

        report
    }

    fn prepare(&self, query: &str, listings: &[crate::domain::Listing], time: &str) -> Vec<Outgoing> {
        let new = filter_new(listings, self.seen.links(query));
        if new.is_empty() {
            return Vec::new();
        }

        tracing::info!("{} new listings for '{query}'", new.len());

        let layout = BatchLayout {
            header: match_header(query, new.len()),
            subject_len: match_subject(query, time, new.len(), new.len()).chars().count(),
        };
        let batches = batch(&new, &self.config.format, &layout, self.config.char_limit);
        let total = batches.len();

        batches
            .into_iter()
            .enumerate()
            .map(|(i, batch)| Outgoing {
                query: query.to_string(),
                email: Email {
                    sender: self.config.sender.clone(),
                    recipient: self.config.recipient.clone(),
                    subject: match_subject(query, time, i + 1, total),
                    body: batch.body(),
                },
                batch,
            })
            .collect()
    }

    /// Sends every batch through one session; only delivered batches are
    /// marked seen, so failed ones come back next cycle.
    fn deliver(&mut self, outgoing: Vec<Outgoing>, report: &mut CycleReport) {
        if outgoing.is_empty() {
            return;
        }

        let emails: Vec<Email> = outgoing.iter().map(|o| o.email.clone()).collect();
        let results = match self.transport.send_all(&emails) {
            Ok(results) => results,
            Err(e) => {
                report.fail(FailureKind::Error, format!("Could not open mail session: {e}"));
                return;
            }
        };

        for (item, result) in outgoing.into_iter().zip(results) {
            match result {
                Ok(()) => {
                    report.emails_sent += 1;
                    self.seen.mark_seen(&item.query, item.batch.links);
                }
                Err(e) => report.fail(
                    FailureKind::Error,
                    format!("Delivery for '{}' failed: {e}", item.query),
                ),
            }
        }
    }

    fn persist(&self, report: &mut CycleReport) {
        let Some(path) = &self.config.save_path else {
            return;
        };

        if let Err(e) = self.seen.save(path) {
            report.fail(FailureKind::Error, format!("Saving {} failed: {e}", path.display()));
        }
    }

    fn account(&mut self, report: &CycleReport) -> Result<(), NotifyError> {
        let Some(kind) = report.failure_kind() else {
            self.failures.recover();
            return Ok(());
        };

        if kind == FailureKind::Error {
            tracing::error!("Cycle failed:\n{}", report.summary());
        }

        match self.failures.record(kind) {
            Escalation::Continue => Ok(()),
            Escalation::NotifyOperator => {
                self.notify_operator(&report.summary());
                Ok(())
            }
            Escalation::Abort => {
                tracing::error!("Too many exceptions, terminating");
                Err(NotifyError::TooManyFailures {
                    failures: self.failures.failures(),
                    last_error: report.summary(),
                })
            }
        }
    }

    fn notify_operator(&self, error: &str) {
        tracing::info!("Sending exception message to {}", self.config.operator);

        let email = Email {
            sender: self.config.sender.clone(),
            recipient: self.config.operator.clone(),
            subject: FAILURE_SUBJECT.to_string(),
            body: failure_body(
                self.failures.failures(),
                self.failures.abort_failures(),
                error,
            ),
        };

        match self.transport.send_all(std::slice::from_ref(&email)) {
            Ok(results) => {
                for e in results.into_iter().filter_map(Result::err) {
                    tracing::warn!("Exception message not sent: {e}");
                }
            }
            Err(e) => tracing::warn!("Exception message not sent: {e}"),
        }
    }

    fn log_seen_daily(&mut self) {
        let today = Local::now().date_naive();
        if self.last_seen_log != Some(today) {
            tracing::debug!("seen list: {:?}", self.seen);
            self.last_seen_log = Some(today);
        }
    }
}
