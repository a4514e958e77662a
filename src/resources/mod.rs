//! JSON resources - Presentation transforms from rows to response bodies.
//!
//! Single rows are wrapped as `{"data": ...}` and pages as
//! `{"data": [...], "links": {...}, "meta": {...}}`. Relations that were not
//! loaded are left out of the output entirely, while a loaded relation with
//! no row serializes as `null`.

pub mod company;
pub mod document;
pub mod event;
pub mod menu_item;
pub mod payment_type;
pub mod store;
pub mod user;

use crate::entities::tag;
use crate::query::Page;
use chrono::NaiveDateTime;
use serde::Serialize;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Formats a timestamp as `2020-11-26 19:01:56`.
#[must_use]
pub fn timestamp(value: &NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

/// [`timestamp`] for nullable columns.
#[must_use]
pub fn optional_timestamp(value: Option<&NaiveDateTime>) -> Option<String> {
    value.map(timestamp)
}

/// `{"data": ...}` with an optional `meta` block
#[derive(Debug, Serialize)]
pub struct Item<T, M = ()> {
    /// The resource
    pub data: T,
    /// Extra data, omitted when `None`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<M>,
}

impl<T> Item<T> {
    /// Wraps `data` without `meta`.
    pub const fn new(data: T) -> Self {
        Self { data, meta: None }
    }
}

impl<T, M> Item<T, M> {
    /// Wraps `data` with a `meta` block.
    pub const fn with_meta(data: T, meta: M) -> Self {
        Self {
            data,
            meta: Some(meta),
        }
    }
}

/// Pagination links
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Links {
    /// First page
    pub first: String,
    /// Last page
    pub last: String,
    /// Previous page, `null` on the first
    pub prev: Option<String>,
    /// Next page, `null` on the last
    pub next: Option<String>,
}

/// Pagination counters. `from` and `to` are 1-based row positions, `null` on
/// an empty page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Meta {
    /// 1-based page number
    pub current_page: u64,
    /// Position of the first row
    pub from: Option<u64>,
    /// Number of the last page
    pub last_page: u64,
    /// Request path the links are built on
    pub path: String,
    /// Page size
    pub per_page: u64,
    /// Position of the last row
    pub to: Option<u64>,
    /// Rows matching the filters
    pub total: u64,
}

/// A paginated list
#[derive(Debug, Serialize)]
pub struct Collection<T> {
    /// Rows on this page
    pub data: Vec<T>,
    /// Navigation links
    pub links: Links,
    /// Counters
    pub meta: Meta,
}

fn page_url(path: &str, number: u64, size: u64) -> String {
    format!("{path}?page%5Bnumber%5D={number}&page%5Bsize%5D={size}")
}

impl<T> Collection<T> {
    /// Wraps a page of already transformed rows. `path` is the request path
    /// the links point back to.
    pub fn from_page(page: Page<T>, path: &str) -> Self {
        let number = page.request.number;
        let size = page.request.size;
        let count = page.items.len() as u64;
        let offset = number.saturating_sub(1).saturating_mul(size);
        let (from, to) = if count == 0 {
            (None, None)
        } else {
            (Some(offset.saturating_add(1)), Some(offset.saturating_add(count)))
        };

        Self {
            links: Links {
                first: page_url(path, 1, size),
                last: page_url(path, page.last_page, size),
                prev: (number > 1).then(|| page_url(path, number - 1, size)),
                next: (number < page.last_page).then(|| page_url(path, number + 1, size)),
            },
            meta: Meta {
                current_page: number,
                from,
                last_page: page.last_page,
                path: path.to_string(),
                per_page: size,
                to,
                total: page.total,
            },
            data: page.items,
        }
    }
}

/// `{"uuid", "name"}` for a tag
#[derive(Debug, Clone, Serialize)]
pub struct TagResource {
    /// Tag uuid
    pub uuid: String,
    /// Tag label
    pub name: String,
}

impl From<&tag::Model> for TagResource {
    fn from(tag: &tag::Model) -> Self {
        Self {
            uuid: tag.uuid.clone(),
            name: tag.name.clone(),
        }
    }
}

/// `{"id", "name"}` for the seeded lookup tables
#[derive(Debug, Clone, Serialize)]
pub struct LookupResource {
    /// Lookup id
    pub id: i32,
    /// Lookup label
    pub name: String,
}

impl LookupResource {
    /// Builds a lookup entry.
    pub fn new(id: i32, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
        }
    }
}

/// Lists of tags are shown in full wherever they appear.
pub fn tags(tags: &[tag::Model]) -> Vec<TagResource> {
    tags.iter().map(TagResource::from).collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::query::PageRequest;
    use serde_json::json;

    fn page(items: Vec<u32>, number: u64, size: u64, total: u64) -> Page<u32> {
        Page {
            items,
            request: PageRequest { number, size },
            total,
            last_page: total.div_ceil(size).max(1),
        }
    }

    #[test]
    fn test_middle_page_links_and_meta() {
        let collection = Collection::from_page(page(vec![4, 5, 6], 2, 3, 8), "/api/foodfleet/stores");
        let value = serde_json::to_value(&collection).unwrap();

        assert_eq!(value["data"], json!([4, 5, 6]));
        assert_eq!(
            value["links"]["prev"],
            "/api/foodfleet/stores?page%5Bnumber%5D=1&page%5Bsize%5D=3"
        );
        assert_eq!(
            value["links"]["next"],
            "/api/foodfleet/stores?page%5Bnumber%5D=3&page%5Bsize%5D=3"
        );
        assert_eq!(value["meta"]["from"], 4);
        assert_eq!(value["meta"]["to"], 6);
        assert_eq!(value["meta"]["last_page"], 3);
        assert_eq!(value["meta"]["total"], 8);
    }

    #[test]
    fn test_empty_page() {
        let collection = Collection::from_page(page(vec![], 1, 30, 0), "/x");
        let value = serde_json::to_value(&collection).unwrap();
        assert_eq!(value["meta"]["from"], serde_json::Value::Null);
        assert_eq!(value["meta"]["last_page"], 1);
        assert_eq!(value["links"]["prev"], serde_json::Value::Null);
        assert_eq!(value["links"]["next"], serde_json::Value::Null);
    }

    #[test]
    fn test_page_number_past_u64_range_saturates() {
        let collection = Collection::from_page(page(vec![1], u64::MAX, 100, 3), "/x");
        let value = serde_json::to_value(&collection).unwrap();
        assert_eq!(value["meta"]["from"], u64::MAX);
        assert_eq!(value["meta"]["to"], u64::MAX);
        assert_eq!(value["links"]["next"], serde_json::Value::Null);
    }

    #[test]
    fn test_item_meta_is_optional() {
        let plain = serde_json::to_value(Item::new("a")).unwrap();
        assert_eq!(plain, json!({"data": "a"}));
        let with_meta = serde_json::to_value(Item::with_meta("a", json!({"types": []}))).unwrap();
        assert_eq!(with_meta["meta"]["types"], json!([]));
    }

    #[test]
    fn test_timestamp_format() {
        let dt = chrono::NaiveDate::from_ymd_opt(2020, 11, 26)
            .unwrap()
            .and_hms_opt(19, 1, 56)
            .unwrap();
        assert_eq!(timestamp(&dt), "2020-11-26 19:01:56");
        assert_eq!(optional_timestamp(None), None);
    }
}
