use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("Request timed out: {0}")]
    Timeout(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("HTML parse error: {0}")]
    HtmlParse(String),
    #[error("renderSearchSection data not found")]
    MissingSearchData,
    #[error("JSON parse error: {0}")]
    JsonParse(String),
    #[error("Unexpected data shape: {0}")]
    UnexpectedShape(String),
}

impl ScraperError {
    /// Timeouts are routine background noise for the notifier.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ScraperError::Timeout(_))
    }
}

impl From<reqwest::Error> for ScraperError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ScraperError::Timeout(e.to_string())
        } else {
            ScraperError::Network(e.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Invalid number for filter '{key}': {value}")]
    InvalidNumber { key: String, value: String },
    #[error("Could not build search URL: {0}")]
    Url(String),
}
