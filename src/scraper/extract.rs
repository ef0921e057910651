// src/scraper/extract.rs
use crate::domain::Listing;
use crate::scraper::models::RawListing;
use crate::scraper::ScraperError;
use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDateTime, Offset};
use scraper::{Html, Selector};
use serde_json::Value;

pub const LIST_URL: &str = "https://classifieds.ksl.com/listing/";

const RENDER_MARKER: &str = "window.renderSearchSection";
const RENDER_CALL: &str = "renderSearchSection(";
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Extracts listings from a search result page.
///
/// Pages without the expected data yield no listings; the failure is logged so
/// one bad page never stops the other queries of a cycle.
pub fn find_listings(html: &str) -> Vec<Listing> {
    find_listings_with_offset(html, local_offset())
}

pub fn find_listings_with_offset(html: &str, offset: FixedOffset) -> Vec<Listing> {
    match try_find_listings(html, offset) {
        Ok(listings) => listings,
        Err(e) => {
            tracing::warn!("No listings extracted from page: {e}");
            Vec::new()
        }
    }
}

pub fn try_find_listings(html: &str, offset: FixedOffset) -> Result<Vec<Listing>, ScraperError> {
    tracing::debug!("Parsing HTML...");
    let section = extract_search_section(html)?;

    let elements = section
        .get("listings")
        .and_then(Value::as_array)
        .ok_or_else(|| ScraperError::UnexpectedShape("listings missing".to_string()))?;

    tracing::debug!("Converting {} listing entries", elements.len());

    let mut listings = Vec::with_capacity(elements.len());
    for element in elements {
        let raw: RawListing = match serde_json::from_value(element.clone()) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!("Skipping malformed listing: {e}");
                continue;
            }
        };

        if raw.is_featured() {
            continue;
        }

        let Some(id) = raw.id_string() else {
            tracing::debug!("Skipping listing without id");
            continue;
        };

        listings.push(Listing {
            age: listing_age(
                raw.create_time.as_deref(),
                raw.display_time.as_deref(),
                offset,
            ),
            price: raw.price_value(),
            link: format!("{LIST_URL}{id}"),
            title: raw.title.unwrap_or_default(),
            city: raw.city.unwrap_or_default(),
            state: raw.state.unwrap_or_default(),
            description: raw.description.unwrap_or_default(),
        });
    }

    Ok(listings)
}

/// Pulls the JSON object passed to `window.renderSearchSection(...)`.
fn extract_search_section(html: &str) -> Result<Value, ScraperError> {
    let document = Html::parse_document(html);
    let selector =
        Selector::parse("script").map_err(|e| ScraperError::HtmlParse(e.to_string()))?;

    let script = document
        .select(&selector)
        .map(|el| el.text().collect::<String>())
        .find(|text| text.contains(RENDER_MARKER))
        .ok_or(ScraperError::MissingSearchData)?;

    let start = script
        .find(RENDER_CALL)
        .map(|i| i + RENDER_CALL.len())
        .ok_or(ScraperError::MissingSearchData)?;
    let end = script
        .rfind(')')
        .filter(|&end| end >= start)
        .ok_or(ScraperError::MissingSearchData)?;

    serde_json::from_str(&script[start..end]).map_err(|e| ScraperError::JsonParse(e.to_string()))
}

/// Offset between this machine's local time and UTC, rounded to the minute.
pub fn local_offset() -> FixedOffset {
    let secs = Local::now().offset().fix().local_minus_utc();
    let rounded = ((secs as f64 / 60.0).round() as i32) * 60;
    FixedOffset::east_opt(rounded).unwrap_or_else(|| Local::now().offset().fix())
}

/// Age text for a listing.
///
/// Two timestamps give their difference; one gives that moment in local time.
pub fn listing_age(created: Option<&str>, displayed: Option<&str>, offset: FixedOffset) -> String {
    let created = created.and_then(parse_timestamp);
    let displayed = displayed.and_then(parse_timestamp);

    match (created, displayed) {
        (Some(created), Some(displayed)) => format_duration(displayed - created),
        (Some(single), None) | (None, Some(single)) => {
            (single + Duration::seconds(offset.local_minus_utc() as i64))
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        }
        (None, None) => String::new(),
    }
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TIME_FORMAT)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_utc()))
}

/// Renders like `3:04:05`, `1 day, 3:04:05` or `12 days, 0:00:00`.
fn format_duration(d: Duration) -> String {
    let sign = if d < Duration::zero() { "-" } else { "" };
    let total = d.num_seconds().abs();

    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;
    let clock = format!("{hours}:{minutes:02}:{seconds:02}");

    match days {
        0 => format!("{sign}{clock}"),
        1 => format!("{sign}1 day, {clock}"),
        n => format!("{sign}{n} days, {clock}"),
    }
}
