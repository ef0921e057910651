// src/domain/report.rs

use crate::domain::listing::Listing;

/// Plain-text report printed by the one-shot `search` command.
pub fn gather_report(listings: &[Listing]) -> String {
    tracing::debug!("Gathering report for {} listings", listings.len());

    let mut report = String::new();
    for listing in listings {
        report.push_str(&format!(
            "{} - ${} - {} : {}, {}\n   {}\n   {}\n\n",
            listing.title,
            listing.price_display(),
            listing.age,
            listing.city,
            listing.state,
            listing.link,
            listing.description
        ));
    }
    report
}
