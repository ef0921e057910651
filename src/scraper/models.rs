use serde::Deserialize;
use serde_json::Value;

// window.renderSearchSection({
//  ├── listings: [
//  │    ├── id
//  │    ├── title
//  │    ├── city
//  │    ├── state
//  │    ├── description
//  │    ├── price            (absent for free items)
//  │    ├── listingType      ("featured" ads are promoted duplicates)
//  │    ├── displayTime      ("2024-05-01T16:00:00Z")
//  │    └── createTime       (older pages only)
//  │  ]
//  ├── displayType
//  └── userData
// })
//
// Other keys seen on listings but unused here:
//  memberId, category, subCategory, email, homePhone, marketType, name,
//  sellerType, zip, photo, newUsed, pageviews, favorited, reducedPriceData,
//  source

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawListing {
    pub id: Value,
    pub title: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub description: Option<String>,
    pub price: Option<Value>,
    pub listing_type: Option<Value>,
    pub display_time: Option<String>,
    pub create_time: Option<String>,
}

impl RawListing {
    /// Promoted listings repeat organic results and are never reported.
    pub fn is_featured(&self) -> bool {
        match &self.listing_type {
            Some(Value::String(kind)) => kind.contains("featured"),
            Some(Value::Array(kinds)) => kinds
                .iter()
                .any(|k| k.as_str().is_some_and(|k| k == "featured")),
            _ => false,
        }
    }

    pub fn id_string(&self) -> Option<String> {
        match &self.id {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Missing or unreadable prices count as free.
    pub fn price_value(&self) -> f64 {
        match &self.price {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(Value::String(s)) => s
                .trim()
                .trim_start_matches('$')
                .replace(',', "")
                .parse()
                .unwrap_or(0.0),
            _ => 0.0,
        }
    }
}
