//! Store resources: the full store, its summaries and the status statistics.

use super::{
    LookupResource, TagResource, document::DocumentResource, event::EventResource,
    menu_item::MenuItemResource, tags, timestamp,
    user::{UserResource, loaded},
};
use crate::core::store::{ServiceSummary, StoreDetails};
use crate::entities::{company, store, store_status};
use serde::Serialize;

/// `{"uuid", "name"}` reference to a store
#[derive(Debug, Clone, Serialize)]
pub struct StoreRef {
    /// Store uuid
    pub uuid: String,
    /// Store name
    pub name: String,
}

impl From<&store::Model> for StoreRef {
    fn from(store: &store::Model) -> Self {
        Self {
            uuid: store.uuid.clone(),
            name: store.name.clone(),
        }
    }
}

/// The supplying company as shown on a store
#[derive(Debug, Clone, Serialize)]
pub struct SupplierResource {
    /// Company uuid
    pub uuid: String,
    /// Company name
    pub name: String,
    /// Company admin, with `include=supplier.admin`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin: Option<Option<UserResource>>,
}

impl SupplierResource {
    fn new(company: &company::Model, admin: Option<Option<UserResource>>) -> Self {
        Self {
            uuid: company.uuid.clone(),
            name: company.name.clone(),
            admin,
        }
    }
}

/// JSON form of a store
#[derive(Debug, Clone, Serialize)]
pub struct StoreResource {
    /// Numeric surrogate key
    pub id: i64,
    /// Public identifier used in routes
    pub uuid: String,
    /// Display name
    pub name: String,
    /// Store status id
    pub status_id: i32,
    /// Store type id
    pub type_id: Option<i32>,
    /// Owning user
    pub owner_uuid: Option<String>,
    /// Supplying company
    pub supplier_uuid: Option<String>,
    /// Square merchant id
    pub square_id: Option<String>,
    /// Truck or stand size
    pub size: Option<i32>,
    /// Contact phone number
    pub contact_phone: Option<String>,
    /// State the business is registered in
    pub state_of_incorporation: Option<String>,
    /// Store website
    pub website: Option<String>,
    /// Twitter profile URL
    pub twitter: Option<String>,
    /// Facebook page URL
    pub facebook: Option<String>,
    /// Instagram profile URL
    pub instagram: Option<String>,
    /// Internal notes
    pub staff_notes: Option<String>,
    /// Storage-relative image path
    pub image: Option<String>,
    /// Creation time
    pub created_at: String,
    /// Last modification time
    pub updated_at: String,
    /// Applied tags
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<TagResource>>,
    /// Events, with `include=events`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<EventResource>>,
    /// Number of events, with `provide=events-count`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events_count: Option<u64>,
    /// Supplier, with `include=supplier`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier: Option<Option<SupplierResource>>,
    /// Status, with `include=status`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Option<LookupResource>>,
    /// Owner, with `include=owner`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Option<UserResource>>,
    /// Type, with `include=type`
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub store_type: Option<Option<LookupResource>>,
    /// Menu items, with `include=menus`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub menus: Option<Vec<MenuItemResource>>,
    /// Documents, with `include=documents`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<DocumentResource>>,
}

impl From<store::Model> for StoreResource {
    fn from(store: store::Model) -> Self {
        Self::from(StoreDetails::new(store))
    }
}

impl From<StoreDetails> for StoreResource {
    fn from(details: StoreDetails) -> Self {
        let admin = loaded(details.supplier_admin.as_ref());
        let supplier = details.supplier.map(|supplier| {
            supplier
                .as_ref()
                .map(|company| SupplierResource::new(company, admin.clone()))
        });
        let store = details.store;

        Self {
            id: store.id,
            uuid: store.uuid,
            name: store.name,
            status_id: store.status_id,
            type_id: store.type_id,
            owner_uuid: store.owner_uuid,
            supplier_uuid: store.supplier_uuid,
            square_id: store.square_id,
            size: store.size,
            contact_phone: store.contact_phone,
            state_of_incorporation: store.state_of_incorporation,
            website: store.website,
            twitter: store.twitter,
            facebook: store.facebook,
            instagram: store.instagram,
            staff_notes: store.staff_notes,
            image: store.image,
            created_at: timestamp(&store.created_at),
            updated_at: timestamp(&store.updated_at),
            tags: details.tags.as_deref().map(tags),
            events: details
                .events
                .map(|events| events.iter().map(EventResource::from).collect()),
            events_count: details.events_count,
            supplier,
            status: details
                .status
                .map(|s| s.map(|s| LookupResource::new(s.id, &s.name))),
            owner: loaded(details.owner.as_ref()),
            store_type: details
                .store_type
                .map(|t| t.map(|t| LookupResource::new(t.id, &t.name))),
            menus: details
                .menus
                .map(|menus| menus.iter().map(MenuItemResource::from).collect()),
            documents: details
                .documents
                .map(|docs| docs.into_iter().map(DocumentResource::from).collect()),
        }
    }
}

/// Compact store card with its tags
#[derive(Debug, Clone, Serialize)]
pub struct StoreSummaryResource {
    /// Store uuid
    pub uuid: String,
    /// Store name
    pub name: String,
    /// Store status id
    pub status_id: i32,
    /// Storage-relative image path
    pub image: Option<String>,
    /// Square merchant id
    pub square_id: Option<String>,
    /// Contact phone number
    pub contact_phone: Option<String>,
    /// Applied tags
    pub tags: Vec<TagResource>,
    /// Owner, with `include=owner`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Option<UserResource>>,
}

impl From<StoreDetails> for StoreSummaryResource {
    fn from(details: StoreDetails) -> Self {
        let store = details.store;
        Self {
            uuid: store.uuid,
            name: store.name,
            status_id: store.status_id,
            image: store.image,
            square_id: store.square_id,
            contact_phone: store.contact_phone,
            tags: details.tags.as_deref().map(tags).unwrap_or_default(),
            owner: loaded(details.owner.as_ref()),
        }
    }
}

/// Event counts for one store
#[derive(Debug, Clone, Serialize)]
pub struct ServiceSummaryResource {
    /// Store uuid
    pub uuid: String,
    /// Store name
    pub name: String,
    /// Every event the store is attached to
    pub total_events: usize,
    /// Events starting after now
    pub upcoming_events: usize,
    /// Events that ended before now
    pub past_events: usize,
}

impl From<ServiceSummary> for ServiceSummaryResource {
    fn from(summary: ServiceSummary) -> Self {
        Self {
            uuid: summary.store.uuid,
            name: summary.store.name,
            total_events: summary.counts.total,
            upcoming_events: summary.counts.upcoming,
            past_events: summary.counts.past,
        }
    }
}

/// A store status with the number of stores in it
#[derive(Debug, Clone, Serialize)]
pub struct StatisticResource {
    /// Store status id
    pub id: i32,
    /// Store status label
    pub name: String,
    /// Stores in that status
    pub stores_count: u64,
}

impl From<(store_status::Model, u64)> for StatisticResource {
    fn from((status, stores_count): (store_status::Model, u64)) -> Self {
        Self {
            id: status.id,
            name: status.name,
            stores_count,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::store::new_store;
    use crate::entities::tag;

    #[test]
    fn test_unloaded_relations_are_omitted() {
        let mut store = new_store();
        store.square_access_token = Some("secret".to_string());
        let value = serde_json::to_value(StoreResource::from(store)).unwrap();

        assert_eq!(value["status_id"], 1);
        assert!(value.get("tags").is_none());
        assert!(value.get("supplier").is_none());
        assert!(value.get("events_count").is_none());
        assert!(value.get("square_access_token").is_none());
    }

    #[test]
    fn test_loaded_relations_are_shown() {
        let mut details = StoreDetails::new(new_store());
        details.tags = Some(vec![tag::Model {
            id: 1,
            uuid: "t1".to_string(),
            name: "Vegan".to_string(),
        }]);
        details.owner = Some(None);
        details.events_count = Some(3);
        let value = serde_json::to_value(StoreResource::from(details)).unwrap();

        assert_eq!(value["tags"][0]["name"], "Vegan");
        assert!(value["owner"].is_null());
        assert_eq!(value["events_count"], 3);
    }
}
