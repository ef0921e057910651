// src/scraper/query.rs
use crate::scraper::QueryError;
use std::collections::HashSet;
use url::Url;

pub const SEARCH_URL: &str = "https://classifieds.ksl.com/search/";

/// Region used when a city is given without a state.
const DEFAULT_STATE: &str = "UT";

/// Search filters understood by the classifieds search page.
///
/// Prices of 0 mean "no bound". Flags are always sent as `0`/`1`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilters {
    pub min_price: i64,
    pub max_price: i64,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub miles: Option<u32>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub sort: bool,
    pub sold: bool,
    pub expand_search: bool,
}

impl SearchFilters {
    /// Builds filters from loose `key=value` style pairs.
    ///
    /// Unknown keys are dropped. Numeric and flag values that do not parse are
    /// reported here, before anything touches the network.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut filters = SearchFilters::default();

        for (key, value) in pairs {
            let key = key.as_ref();
            let value = value.as_ref().trim();

            match key {
                "min_price" => filters.min_price = parse_price(key, value)?,
                "max_price" => filters.max_price = parse_price(key, value)?,
                "miles" => {
                    filters.miles = if value.is_empty() {
                        None
                    } else {
                        Some(value.parse().map_err(|_| invalid(key, value))?)
                    }
                }
                "city" => filters.city = non_empty(value),
                "state" => filters.state = non_empty(value),
                "zip" => filters.zip = non_empty(value),
                "category" => filters.category = non_empty(value),
                "subCategory" => filters.sub_category = non_empty(value),
                "sort" => filters.sort = parse_flag(key, value)?,
                "sold" => filters.sold = parse_flag(key, value)?,
                "expandSearch" => filters.expand_search = parse_flag(key, value)?,
                other => tracing::debug!("Ignoring unrecognized filter '{other}'"),
            }
        }

        Ok(filters)
    }

    /// Price bounds as they go into the URL: lower bound first, zeros unset.
    pub fn price_bounds(&self) -> (Option<i64>, Option<i64>) {
        let mut min = self.min_price.max(0);
        let mut max = self.max_price.max(0);

        if min != 0 && max != 0 && min > max {
            std::mem::swap(&mut min, &mut max);
        }

        let bound = |p: i64| if p == 0 { None } else { Some(p) };
        (bound(min), bound(max))
    }

    /// Ordered query parameters for one search term.
    pub fn params(&self, keyword: &str) -> Vec<(&'static str, String)> {
        let (price_from, price_to) = self.price_bounds();

        let city = self.city.clone().filter(|c| !c.is_empty());
        let state = match (&city, self.state.clone().filter(|s| !s.is_empty())) {
            (Some(_), None) => Some(DEFAULT_STATE.to_string()),
            (_, state) => state,
        };

        let flag = |b: bool| if b { "1" } else { "0" }.to_string();

        let candidates: Vec<(&'static str, Option<String>)> = vec![
            ("keyword", Some(keyword.to_string())),
            ("priceFrom", price_from.map(|p| p.to_string())),
            ("priceTo", price_to.map(|p| p.to_string())),
            // don't cache results, FRESH!
            ("nocache", Some("1".to_string())),
            ("expandSearch", Some(flag(self.expand_search))),
            ("zip", self.zip.clone()),
            ("miles", self.miles.map(|m| m.to_string())),
            ("sort", Some(flag(self.sort))),
            ("sold", Some(flag(self.sold))),
            ("city", city),
            ("state", state),
            ("subCategory", self.sub_category.clone()),
            ("category", self.category.clone()),
        ];

        candidates
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k, v)))
            .collect()
    }
}

/// Builds the search URL for a single term, e.g.
/// `https://classifieds.ksl.com/search/keyword/bike/nocache/1/.../`
pub fn build_search_url(keyword: &str, filters: &SearchFilters) -> Result<String, QueryError> {
    let params = filters.params(keyword);
    tracing::debug!("Using the following query params: {params:?}");

    let mut url = Url::parse(SEARCH_URL).map_err(|e| QueryError::Url(e.to_string()))?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| QueryError::Url(format!("{SEARCH_URL} cannot be a base")))?;
        segments.pop_if_empty();
        for (key, value) in &params {
            segments.push(key);
            segments.push(value);
        }
        segments.push("");
    }

    tracing::debug!("Generated the search URL: {url}");
    Ok(url.to_string())
}

/// Builds `(term, url)` pairs for every distinct search term, first
/// occurrence first.
pub fn build_query_urls(
    terms: &[String],
    filters: &SearchFilters,
) -> Result<Vec<(String, String)>, QueryError> {
    let mut distinct = HashSet::new();
    terms
        .iter()
        .filter(|&term| distinct.insert(term.as_str()))
        .map(|term| Ok((term.clone(), build_search_url(term, filters)?)))
        .collect()
}

fn parse_price(key: &str, value: &str) -> Result<i64, QueryError> {
    if value.is_empty() {
        return Ok(0);
    }
    value
        .parse::<i64>()
        .map(|p| p.max(0))
        .map_err(|_| invalid(key, value))
}

fn parse_flag(key: &str, value: &str) -> Result<bool, QueryError> {
    match value {
        "" | "0" | "false" => Ok(false),
        "1" | "true" => Ok(true),
        _ => Err(invalid(key, value)),
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn invalid(key: &str, value: &str) -> QueryError {
    QueryError::InvalidNumber {
        key: key.to_string(),
        value: value.to_string(),
    }
}
