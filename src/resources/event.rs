//! Event resource.

use super::{optional_timestamp, timestamp};
use crate::entities::event;
use serde::Serialize;

/// JSON form of an event
#[derive(Debug, Clone, Serialize)]
pub struct EventResource {
    /// Public identifier used in routes
    pub uuid: String,
    /// Event name
    pub name: String,
    /// Event status
    pub status_id: i32,
    /// Event type
    pub type_id: Option<i32>,
    /// Scheduled start
    pub start_at: Option<String>,
    /// Scheduled end
    pub end_at: Option<String>,
    /// Creation time
    pub created_at: String,
    /// Last modification time
    pub updated_at: String,
}

impl From<&event::Model> for EventResource {
    fn from(event: &event::Model) -> Self {
        Self {
            uuid: event.uuid.clone(),
            name: event.name.clone(),
            status_id: event.status_id,
            type_id: event.type_id,
            start_at: optional_timestamp(event.start_at.as_ref()),
            end_at: optional_timestamp(event.end_at.as_ref()),
            created_at: timestamp(&event.created_at),
            updated_at: timestamp(&event.updated_at),
        }
    }
}
