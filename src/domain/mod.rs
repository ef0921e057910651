pub mod listing;
pub mod report;

pub use listing::Listing;
