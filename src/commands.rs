//! Entry points behind the `search` and `notify` subcommands.

use crate::config::{MailSettings, NotifyConfig, SearchConfig};
use crate::domain::report::gather_report;
use crate::errors::AppError;
use crate::mailer::{BrevoMailer, MailTransport, SmtpMailer, DEFAULT_SMTP_TIMEOUT};
use crate::notify::{Notifier, SeenStore};
use crate::scraper::{build_query_urls, find_listings, Fetcher, KslScraper};
use std::path::Path;

/// Fetches every term once and returns `(term, report)` for terms with results.
pub fn run_search<F: Fetcher>(
    config: &SearchConfig,
    fetcher: F,
) -> Result<Vec<(String, String)>, AppError> {
    let targets = build_query_urls(&config.terms, &config.filters)?;
    let scraper = KslScraper::new(fetcher, config.workers, config.timeout);

    let mut reports = Vec::new();
    for page in scraper.search(&targets) {
        let body = match page.body {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Search for '{}' failed: {e}", page.query);
                continue;
            }
        };

        let report = gather_report(&find_listings(&String::from_utf8_lossy(&body)));
        if !report.is_empty() {
            reports.push((page.query, report));
        }
    }

    Ok(reports)
}

/// Prints search reports, with a banner per term when there are several.
pub fn print_reports(reports: &[(String, String)], multiple_terms: bool) {
    for (query, report) in reports {
        if multiple_terms {
            println!("** Search for {query} **");
        }
        println!("{report}");
    }
}

pub fn build_transport(
    settings: &MailSettings,
    sender: &str,
) -> Result<Box<dyn MailTransport>, AppError> {
    let transport: Box<dyn MailTransport> = match settings {
        MailSettings::Smtp { server, password } => Box::new(SmtpMailer::new(
            server,
            sender,
            password,
            DEFAULT_SMTP_TIMEOUT,
        )?),
        MailSettings::Brevo { api_key } => Box::new(BrevoMailer::new(api_key.clone())),
    };
    Ok(transport)
}

pub fn load_seen(path: Option<&Path>) -> Result<SeenStore, AppError> {
    match path {
        Some(path) => Ok(SeenStore::load(path)?),
        None => Ok(SeenStore::new()),
    }
}

/// Verifies the mail account, then runs the notifier in the foreground.
pub fn run_notify<F: Fetcher>(
    config: NotifyConfig,
    transport: &dyn MailTransport,
    fetcher: F,
    seen: SeenStore,
    once: bool,
) -> Result<(), AppError> {
    transport.verify()?;
    tracing::info!(
        "Watching {} searches every {:?}, mailing {}",
        config.search.terms.len(),
        config.interval,
        config.recipient
    );

    let mut notifier = Notifier::new(fetcher, transport, config, seen)?;

    if once {
        let report = notifier.step()?;
        tracing::info!(
            "Cycle finished: {} emails sent, {} failures",
            report.emails_sent,
            report.failures.len()
        );
        return Ok(());
    }

    notifier.run()?;
    Ok(())
}
