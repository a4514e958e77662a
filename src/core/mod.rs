//! Core business logic - framework-agnostic operations over the entities.
//!
//! Each submodule owns one resource: it validates input, reads and writes the
//! tables through `SeaORM`, and loads the relations a response needs. Nothing
//! here knows about HTTP.

pub mod company;
pub mod document;
pub mod event;
pub mod lookup;
pub mod menu_item;
pub mod payment_type;
pub mod store;
pub mod user;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer};

/// Fresh public identifier for a new row.
pub(crate) fn new_uuid() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Current UTC time truncated to whole seconds, matching what the database
/// round-trips.
pub(crate) fn now() -> NaiveDateTime {
    let now = chrono::Utc::now().naive_utc();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`) when used with `#[serde(default)]`.
pub(crate) fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
