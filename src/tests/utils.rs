use crate::config::{NotifyConfig, SearchConfig};
use crate::mailer::{Email, MailSession, MailTransport, MailerError};
use crate::notify::FormatOptions;
use crate::scraper::extract::LIST_URL;
use crate::scraper::query::build_search_url;
use crate::scraper::{Fetcher, ScraperError, SearchFilters};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

pub fn link(id: u32) -> String {
    format!("{LIST_URL}{id}")
}

/// Search page embedding the given `(id, title)` listings.
pub fn listings_page(listings: &[(u32, &str)]) -> String {
    let entries: Vec<String> = listings
        .iter()
        .map(|(id, title)| {
            format!(
                r#"{{"id": {id}, "title": "{title}", "city": "Provo", "state": "UT",
                    "price": 40, "listingType": "normal",
                    "displayTime": "2024-05-01T16:00:00Z", "description": "Good shape"}}"#
            )
        })
        .collect();

    format!(
        "<html><head><script>window.renderSearchSection({{\"listings\": [{}]}})</script></head></html>",
        entries.join(",")
    )
}

#[derive(Debug, Clone)]
pub enum Page {
    Html(String),
    Timeout,
    Down,
}

/// Serves canned pages by search term; the page can be swapped between cycles.
pub struct PageFetcher {
    pages: Mutex<HashMap<String, Page>>,
}

impl PageFetcher {
    pub fn new(pages: Vec<(&str, Page)>) -> Self {
        let pages = pages
            .into_iter()
            .map(|(term, page)| (url_for(term), page))
            .collect();
        Self {
            pages: Mutex::new(pages),
        }
    }

    pub fn set(&self, term: &str, page: Page) {
        self.pages.lock().unwrap().insert(url_for(term), page);
    }
}

impl Fetcher for PageFetcher {
    fn fetch(&self, url: &str, _timeout: Duration) -> Result<Vec<u8>, ScraperError> {
        match self.pages.lock().unwrap().get(url) {
            Some(Page::Html(html)) => Ok(html.clone().into_bytes()),
            Some(Page::Timeout) => Err(ScraperError::Timeout(url.to_string())),
            Some(Page::Down) | None => Err(ScraperError::Network(format!("down: {url}"))),
        }
    }
}

impl Fetcher for &PageFetcher {
    fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, ScraperError> {
        (**self).fetch(url, timeout)
    }
}

pub fn url_for(term: &str) -> String {
    build_search_url(term, &SearchFilters::default()).unwrap()
}

/// Records delivered mail; emails matching `reject` fail to deliver.
pub struct RecordingTransport {
    pub sent: RefCell<Vec<Email>>,
    pub sessions_opened: Cell<usize>,
    pub sessions_closed: Cell<usize>,
    reject: Box<dyn Fn(&Email) -> bool>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::rejecting(|_| false)
    }

    pub fn rejecting(reject: impl Fn(&Email) -> bool + 'static) -> Self {
        Self {
            sent: RefCell::new(Vec::new()),
            sessions_opened: Cell::new(0),
            sessions_closed: Cell::new(0),
            reject: Box::new(reject),
        }
    }

    pub fn sent_to(&self, recipient: &str) -> Vec<Email> {
        self.sent
            .borrow()
            .iter()
            .filter(|e| e.recipient == recipient)
            .cloned()
            .collect()
    }
}

impl MailTransport for RecordingTransport {
    fn verify(&self) -> Result<(), MailerError> {
        Ok(())
    }

    fn open_session(&self) -> Result<Box<dyn MailSession + '_>, MailerError> {
        self.sessions_opened.set(self.sessions_opened.get() + 1);
        Ok(Box::new(RecordingSession { transport: self }))
    }
}

struct RecordingSession<'a> {
    transport: &'a RecordingTransport,
}

impl MailSession for RecordingSession<'_> {
    fn deliver(&mut self, email: &Email) -> Result<(), MailerError> {
        if (self.transport.reject)(email) {
            return Err(MailerError::Smtp("550 rejected".to_string()));
        }
        self.transport.sent.borrow_mut().push(email.clone());
        Ok(())
    }
}

impl Drop for RecordingSession<'_> {
    fn drop(&mut self) {
        let closed = &self.transport.sessions_closed;
        closed.set(closed.get() + 1);
    }
}

pub fn notify_config(terms: &[&str]) -> NotifyConfig {
    NotifyConfig {
        search: SearchConfig {
            terms: terms.iter().map(|t| t.to_string()).collect(),
            filters: SearchFilters::default(),
            workers: 4,
            timeout: Duration::from_secs(5),
        },
        sender: "me@gmail.com".to_string(),
        recipient: "phone@sms.example".to_string(),
        operator: "ops@example.com".to_string(),
        format: FormatOptions::default(),
        char_limit: None,
        interval: Duration::from_millis(1),
        save_path: None,
        repeated_failures: 5,
    }
}
