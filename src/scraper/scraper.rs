// scraper.rs
use crate::scraper::fetcher::Fetcher;
use crate::scraper::ScraperError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub const DEFAULT_WORKERS: usize = 4;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Raw page for one search term.
#[derive(Debug)]
pub struct QueryPage {
    pub query: String,
    pub body: Result<Vec<u8>, ScraperError>,
}

/// Fetches a cycle's worth of search pages through a bounded set of workers.
pub struct KslScraper<F: Fetcher> {
    fetcher: F,
    workers: usize,
    timeout: Duration,
}

impl<F: Fetcher> KslScraper<F> {
    pub fn new(fetcher: F, workers: usize, timeout: Duration) -> Self {
        Self {
            fetcher,
            workers: workers.max(1),
            timeout,
        }
    }

    /// Fetches every `(query, url)` pair and returns the pages in input order.
    ///
    /// Blocks until all fetches finished or timed out. A failed fetch only
    /// affects its own entry.
    pub fn search(&self, targets: &[(String, String)]) -> Vec<QueryPage> {
        if targets.is_empty() {
            return Vec::new();
        }

        let workers = self.workers.min(targets.len());
        tracing::debug!(
            "Fetching {} search pages with {workers} workers",
            targets.len()
        );

        let next = AtomicUsize::new(0);
        let slots: Mutex<Vec<Option<Result<Vec<u8>, ScraperError>>>> =
            Mutex::new((0..targets.len()).map(|_| None).collect());

        std::thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| loop {
                    let i = next.fetch_add(1, Ordering::SeqCst);
                    let Some((query, url)) = targets.get(i) else {
                        break;
                    };

                    let result = self.fetcher.fetch(url, self.timeout);
                    if let Err(e) = &result {
                        tracing::warn!("Fetch for '{query}' failed: {e}");
                    }

                    if let Ok(mut slots) = slots.lock() {
                        slots[i] = Some(result);
                    }
                });
            }
        });

        let slots = slots.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());

        targets
            .iter()
            .zip(slots)
            .map(|((query, _), slot)| QueryPage {
                query: query.clone(),
                body: slot.unwrap_or_else(|| {
                    Err(ScraperError::Network("fetch did not complete".to_string()))
                }),
            })
            .collect()
    }
}
