// src/domain/listing.rs

/// A single classifieds ad, flattened from the page's listing blob.
///
/// `link` is the only stable identity; every other field may change between
/// fetches or collide across listings.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub title: String,
    pub city: String,
    pub state: String,
    /// Either a local timestamp or a "days, h:mm:ss" duration.
    pub age: String,
    /// Free items come through without a price and are stored as 0.
    pub price: f64,
    pub link: String,
    pub description: String,
}

impl Listing {
    /// Price without a trailing `.0` for whole dollar amounts.
    pub fn price_display(&self) -> String {
        if self.price.fract() == 0.0 {
            format!("{}", self.price as i64)
        } else {
            format!("{:.2}", self.price)
        }
    }
}
