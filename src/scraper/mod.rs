pub mod extract;
pub mod fetcher;
mod models;
pub mod query;
mod scraper;
mod scraper_error;

pub use extract::find_listings;
pub use fetcher::{Fetcher, HttpFetcher};
pub use query::{build_query_urls, SearchFilters};
pub use self::scraper::{KslScraper, QueryPage, DEFAULT_TIMEOUT, DEFAULT_WORKERS};
pub use scraper_error::{QueryError, ScraperError};
