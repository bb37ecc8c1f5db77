use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// One page of a backend listing.
///
/// The backend answers either with a `{results, next, previous}` envelope or with
/// a bare array; anything else is read as an empty listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            has_next: false,
            has_previous: false,
        }
    }
}

impl<T: DeserializeOwned> Page<T> {
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        match value {
            Value::Object(mut map) if map.get("results").is_some_and(Value::is_array) => {
                let has_next = map.get("next").is_some_and(|v| !v.is_null());
                let has_previous = map.get("previous").is_some_and(|v| !v.is_null());
                let results = map.remove("results").unwrap_or_default();
                Ok(Self {
                    items: serde_json::from_value(results)?,
                    has_next,
                    has_previous,
                })
            }
            Value::Array(_) => Ok(Self {
                items: serde_json::from_value(value)?,
                has_next: false,
                has_previous: false,
            }),
            _ => Ok(Self::default()),
        }
    }
}

/// Page numbers the screens offer for navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub next_page: Option<u32>,
    pub previous_page: Option<u32>,
}

impl Pagination {
    pub fn of<T>(page: u32, listing: &Page<T>) -> Self {
        Self {
            page,
            next_page: page.checked_add(1).filter(|_| listing.has_next),
            previous_page: listing.has_previous.then(|| page.saturating_sub(1)),
        }
    }
}
