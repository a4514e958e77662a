//! Events a store is attached to, and the commission terms on that link.

use crate::{
    core::now,
    entities::{Event, EventStore, event, event_store},
    errors::{Error, Result},
    query::{ListQuery, Page, apply_sorts, paginate},
};
use sea_orm::{Condition, QueryOrder, QuerySelect, Set, prelude::*};
use tracing::{debug, info};

/// Allowed `filter[...]` names for a store's events
pub const FILTERS: &[&str] = &["name", "status_id", "uuid"];

/// Allowed `sort` names for a store's events
pub const SORTS: &[&str] = &["status_id", "created_at", "start_at", "name", "type_id"];

/// Uuids of every event `store_uuid` is attached to.
pub async fn get_event_uuids_for_store(
    db: &DatabaseConnection,
    store_uuid: &str,
) -> Result<Vec<String>> {
    EventStore::find()
        .select_only()
        .column(event_store::Column::EventUuid)
        .filter(event_store::Column::StoreUuid.eq(store_uuid))
        .into_tuple()
        .all(db)
        .await
        .map_err(Into::into)
}

/// Every event `store_uuid` is attached to, ordered by id.
pub async fn get_events_for_store(
    db: &DatabaseConnection,
    store_uuid: &str,
) -> Result<Vec<event::Model>> {
    let uuids = get_event_uuids_for_store(db, store_uuid).await?;
    if uuids.is_empty() {
        return Ok(Vec::new());
    }
    Event::find()
        .filter(event::Column::Uuid.is_in(uuids))
        .order_by_asc(event::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Number of events `store_uuid` is attached to.
pub async fn count_events_for_store(db: &DatabaseConnection, store_uuid: &str) -> Result<u64> {
    EventStore::find()
        .filter(event_store::Column::StoreUuid.eq(store_uuid))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Lists the events of `store_uuid` with the filters and sorts in `query`.
///
/// # Errors
/// Returns `Error::InvalidQuery` for unknown filters or sorts.
pub async fn list_store_events(
    db: &DatabaseConnection,
    store_uuid: &str,
    query: &ListQuery,
) -> Result<Page<event::Model>> {
    query.allow_filters(FILTERS)?;
    query.allow_sorts(SORTS)?;

    let uuids = get_event_uuids_for_store(db, store_uuid).await?;
    let condition = Condition::all()
        .add(event::Column::Uuid.is_in(uuids))
        .add_option(query.partial("name", event::Column::Name))
        .add_option(query.exact_int("status_id", event::Column::StatusId)?)
        .add_option(query.exact("uuid", event::Column::Uuid));

    let select = apply_sorts(
        Event::find().filter(condition),
        query,
        &[
            ("status_id", event::Column::StatusId),
            ("created_at", event::Column::CreatedAt),
            ("start_at", event::Column::StartAt),
            ("name", event::Column::Name),
            ("type_id", event::Column::TypeId),
        ],
        event::Column::Id,
    );
    paginate(db, select, query.page()).await
}

/// Finds an event by uuid.
pub async fn get_event_by_uuid(db: &DatabaseConnection, uuid: &str) -> Result<Option<event::Model>> {
    Event::find()
        .filter(event::Column::Uuid.eq(uuid))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Updates the commission terms on an existing event/store link. Does nothing
/// if the store is not attached to the event.
///
/// # Errors
/// Returns `Error::NotFound` if the event does not exist.
pub async fn update_commission(
    db: &DatabaseConnection,
    store_uuid: &str,
    event_uuid: &str,
    commission_rate: i32,
    commission_type: i32,
) -> Result<Option<event_store::Model>> {
    if get_event_by_uuid(db, event_uuid).await?.is_none() {
        return Err(Error::not_found("event", event_uuid));
    }

    let Some(link) = EventStore::find_by_id((event_uuid.to_string(), store_uuid.to_string()))
        .one(db)
        .await?
    else {
        debug!(
            "Store {} is not attached to event {}, commission unchanged",
            store_uuid, event_uuid
        );
        return Ok(None);
    };

    let mut link: event_store::ActiveModel = link.into();
    link.commission_rate = Set(Some(commission_rate));
    link.commission_type = Set(Some(commission_type));
    let link = link.update(db).await?;
    info!(
        "Updated commission for store {} at event {}: {} (type {})",
        store_uuid, event_uuid, commission_rate, commission_type
    );
    Ok(Some(link))
}

/// Event counts for the service summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventCounts {
    /// Every event
    pub total: usize,
    /// Starting after now
    pub upcoming: usize,
    /// Ended before now
    pub past: usize,
}

/// Splits `events` into upcoming (starting after now) and past (ended before now).
#[must_use]
pub fn count_by_schedule(events: &[event::Model]) -> EventCounts {
    let now = now();
    EventCounts {
        total: events.len(),
        upcoming: events
            .iter()
            .filter(|e| e.start_at.is_some_and(|start| start > now))
            .count(),
        past: events
            .iter()
            .filter(|e| e.end_at.is_some_and(|end| end < now))
            .count(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::config::settings::PaginationConfig;
    use crate::test_utils::*;
    use chrono::Duration;

    fn list_query(pairs: &[(&str, &str)]) -> ListQuery {
        ListQuery::from_pairs(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            PaginationConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_events_for_store() -> Result<()> {
        let db = setup_test_db().await?;
        let store = create_test_store(&db, "Grill").await?;
        let other = create_test_store(&db, "Cart").await?;
        let fair = create_test_event(&db, "County Fair").await?;
        let market = create_test_event(&db, "Night Market").await?;
        attach_store_to_event(&db, &fair, &store).await?;
        attach_store_to_event(&db, &market, &store).await?;
        attach_store_to_event(&db, &market, &other).await?;

        let events = get_events_for_store(&db, &store.uuid).await?;
        assert_eq!(events.len(), 2);
        assert_eq!(count_events_for_store(&db, &other.uuid).await?, 1);

        let page = list_store_events(&db, &store.uuid, &list_query(&[("filter[name]", "market")]))
            .await?;
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].uuid, market.uuid);

        let page = list_store_events(&db, &store.uuid, &list_query(&[("sort", "-name")])).await?;
        assert_eq!(page.items[0].uuid, market.uuid);

        let bad = list_store_events(&db, &store.uuid, &list_query(&[("sort", "budget")])).await;
        assert!(matches!(bad, Err(Error::InvalidQuery { message: _ })));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_commission() -> Result<()> {
        let db = setup_test_db().await?;
        let store = create_test_store(&db, "Grill").await?;
        let fair = create_test_event(&db, "County Fair").await?;
        let other = create_test_event(&db, "Rodeo").await?;
        attach_store_to_event(&db, &fair, &store).await?;

        let link = update_commission(&db, &store.uuid, &fair.uuid, 15, 1).await?;
        let link = link.unwrap();
        assert_eq!(link.commission_rate, Some(15));
        assert_eq!(link.commission_type, Some(1));

        assert!(update_commission(&db, &store.uuid, &other.uuid, 15, 1).await?.is_none());
        assert!(matches!(
            update_commission(&db, &store.uuid, "missing", 15, 1).await,
            Err(Error::NotFound { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_count_by_schedule() {
        let now = now();
        let event = |start: Option<i64>, end: Option<i64>| event::Model {
            id: 0,
            uuid: String::new(),
            name: String::new(),
            status_id: 1,
            type_id: None,
            start_at: start.map(|d| now + Duration::days(d)),
            end_at: end.map(|d| now + Duration::days(d)),
            created_at: now,
            updated_at: now,
        };
        let events = vec![
            event(Some(3), Some(4)),
            event(Some(-5), Some(-4)),
            event(Some(-1), Some(1)),
            event(None, None),
        ];
        assert_eq!(
            count_by_schedule(&events),
            EventCounts {
                total: 4,
                upcoming: 1,
                past: 1,
            }
        );
    }
}
