//! Store business logic - Handles the fleet members.
//!
//! Creating and updating a store validates the references it points at,
//! writes the inline image to storage, syncs its tags and, on update, the
//! commission terms for one event. A store attached to any event cannot be
//! deleted.

use crate::{
    core::{event, lookup, new_uuid, now, user},
    entities::{
        Company, Document, MenuItem, Store, StoreTag, Tag, company, document, event as event_entity,
        menu_item, store, store_status, store_tag, store_type, tag, user as user_entity,
    },
    errors::{Error, Result},
    query::{ListQuery, Page, paginate},
    square::{ListLocations, Location, LocationsApi},
    storage::{Storage, decode_image},
    validation::Validator,
};
use sea_orm::{
    Condition, JoinType, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
    prelude::*,
    sea_query::{Expr, Query, SimpleExpr},
};
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, warn};

use super::present;

/// Body accepted by create and update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreInput {
    /// Display name, required on create
    pub name: Option<String>,
    /// `store_statuses` id, defaults to Draft
    pub status_id: Option<i32>,
    /// `store_types` id
    pub type_id: Option<i32>,
    /// Owning user
    pub owner_uuid: Option<String>,
    /// Supplier company, taken from the user on create
    pub supplier_uuid: Option<String>,
    /// Square merchant id
    pub square_id: Option<String>,
    /// Truck or stand size
    pub size: Option<i32>,
    /// Contact phone number
    pub contact_phone: Option<String>,
    /// State the business is registered in
    pub state_of_incorporation: Option<String>,
    /// Must be a URL
    pub website: Option<String>,
    /// Must be a URL
    pub twitter: Option<String>,
    /// Must be a URL
    pub facebook: Option<String>,
    /// Must be a URL
    pub instagram: Option<String>,
    /// Internal notes
    pub staff_notes: Option<String>,
    /// Tag uuids to sync
    pub tags: Option<Vec<String>>,
    /// Outer `None` when absent, `Some(None)` for an explicit `null`
    #[serde(default, deserialize_with = "present")]
    pub image: Option<Option<String>>,
    /// Event whose commission terms are updated
    pub event_uuid: Option<String>,
    /// New commission rate for `event_uuid`
    pub commission_rate: Option<i32>,
    /// New commission type for `event_uuid`
    pub commission_type: Option<i32>,
}

/// Which relations to load alongside a store
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreIncludes {
    /// `tags`
    pub tags: bool,
    /// `events`
    pub events: bool,
    /// `supplier`
    pub supplier: bool,
    /// `supplier.admin`
    pub supplier_admin: bool,
    /// `status`
    pub status: bool,
    /// `owner`
    pub owner: bool,
    /// `type`
    pub store_type: bool,
    /// `menus`
    pub menus: bool,
    /// `documents`
    pub documents: bool,
    /// `provide=events-count`
    pub events_count: bool,
}

impl StoreIncludes {
    /// Just the tags, as returned after create and update.
    #[must_use]
    pub fn tags() -> Self {
        Self {
            tags: true,
            ..Self::default()
        }
    }

    /// Reads `include=` and `provide=events-count` from the query string.
    #[must_use]
    pub fn from_query(query: &ListQuery) -> Self {
        Self {
            tags: query.includes("tags"),
            events: query.includes("events"),
            supplier: query.includes("supplier"),
            supplier_admin: query.includes("supplier.admin"),
            status: query.includes("status"),
            owner: query.includes("owner"),
            store_type: query.includes("type"),
            menus: query.includes("menus"),
            documents: query.includes("documents"),
            events_count: query.param("provide") == Some("events-count"),
        }
    }
}

/// A store with its loaded relations. A `None` outer option means the
/// relation was not requested.
#[derive(Debug, Clone)]
pub struct StoreDetails {
    /// The store row
    pub store: store::Model,
    /// Applied tags
    pub tags: Option<Vec<tag::Model>>,
    /// Attached events
    pub events: Option<Vec<event_entity::Model>>,
    /// Supplying company
    pub supplier: Option<Option<company::Model>>,
    /// Admin of the supplying company
    pub supplier_admin: Option<Option<user_entity::Model>>,
    /// Status lookup row
    pub status: Option<Option<store_status::Model>>,
    /// Owning user
    pub owner: Option<Option<user_entity::Model>>,
    /// Type lookup row
    pub store_type: Option<Option<store_type::Model>>,
    /// Menu items
    pub menus: Option<Vec<menu_item::Model>>,
    /// Documents assigned to the store
    pub documents: Option<Vec<document::Model>>,
    /// Number of attached events
    pub events_count: Option<u64>,
}

impl StoreDetails {
    /// A store with nothing loaded.
    #[must_use]
    pub const fn new(store: store::Model) -> Self {
        Self {
            store,
            tags: None,
            events: None,
            supplier: None,
            supplier_admin: None,
            status: None,
            owner: None,
            store_type: None,
            menus: None,
            documents: None,
            events_count: None,
        }
    }
}

/// Event totals for one store
#[derive(Debug, Clone)]
pub struct ServiceSummary {
    /// The store row
    pub store: store::Model,
    /// Its events by schedule
    pub counts: event::EventCounts,
}

/// Allowed `filter[...]` names for the store list
pub const FILTERS: &[&str] = &[
    "name",
    "state_of_incorporation",
    "status_id",
    "tag",
    "owner_uuid",
    "type_id",
    "uuid",
    "supplier_uuid",
];

/// Allowed `sort` names for the store list
pub const SORTS: &[&str] = &[
    "name",
    "status_id",
    "created_at",
    "state_of_incorporation",
    "owner",
];

/// Allowed `include` names for the store list
pub const LIST_INCLUDES: &[&str] = &[
    "tags",
    "events",
    "supplier",
    "supplier.admin",
    "status",
    "owner",
    "type",
];

/// Allowed `include` names for a single store
pub const SHOW_INCLUDES: &[&str] = &[
    "menus",
    "tags",
    "documents",
    "events",
    "supplier",
    "supplier.admin",
    "status",
    "owner",
];

/// Allowed `include` names for the store summary
pub const SUMMARY_INCLUDES: &[&str] = &["owner"];

fn tag_condition(query: &ListQuery) -> Option<SimpleExpr> {
    let tags = query.filter_values("tag")?;
    Some(
        store::Column::Uuid.in_subquery(
            Query::select()
                .column(store_tag::Column::StoreUuid)
                .from(StoreTag)
                .and_where(store_tag::Column::TagUuid.is_in(tags))
                .to_owned(),
        ),
    )
}

/// Lists stores with the filters and sorts in `query`.
///
/// # Errors
/// Returns `Error::InvalidQuery` for unknown filters, sorts or includes.
pub async fn list_stores(db: &DatabaseConnection, query: &ListQuery) -> Result<Page<store::Model>> {
    query.allow_filters(FILTERS)?;
    query.allow_sorts(SORTS)?;
    query.allow_includes(LIST_INCLUDES)?;

    let condition = Condition::all()
        .add_option(query.partial("name", store::Column::Name))
        .add_option(query.partial("state_of_incorporation", store::Column::StateOfIncorporation))
        .add_option(query.exact_int("status_id", store::Column::StatusId)?)
        .add_option(query.exact_int("type_id", store::Column::TypeId)?)
        .add_option(query.exact("owner_uuid", store::Column::OwnerUuid))
        .add_option(query.exact("uuid", store::Column::Uuid))
        .add_option(query.exact("supplier_uuid", store::Column::SupplierUuid))
        .add_option(tag_condition(query));

    let mut select = Store::find().filter(condition);
    if query.sorts().iter().any(|s| s.field == "owner") {
        select = select.join(JoinType::LeftJoin, store::Relation::Owner.def());
    }

    let mut sorted = false;
    for sort in query.sorts() {
        let order = sort.order.clone();
        select = match sort.field.as_str() {
            "name" => select.order_by(store::Column::Name, order),
            "status_id" => select.order_by(store::Column::StatusId, order),
            "created_at" => select.order_by(store::Column::CreatedAt, order),
            "state_of_incorporation" => select.order_by(store::Column::StateOfIncorporation, order),
            "owner" => select.order_by(user_entity::Column::Name, order),
            _ => continue,
        };
        sorted = true;
    }
    if !sorted {
        select = select.order_by_asc(store::Column::Id);
    }

    paginate(db, select, query.page()).await
}

/// Finds a store by uuid.
pub async fn get_store_by_uuid(db: &DatabaseConnection, uuid: &str) -> Result<Option<store::Model>> {
    Store::find()
        .filter(store::Column::Uuid.eq(uuid))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a store by uuid or fails with `Error::NotFound`.
pub async fn find_store(db: &DatabaseConnection, uuid: &str) -> Result<store::Model> {
    get_store_by_uuid(db, uuid)
        .await?
        .ok_or_else(|| Error::not_found("store", uuid))
}

/// Unsaved store used to pre-fill the create form.
#[must_use]
pub fn new_store() -> store::Model {
    let now = now();
    store::Model {
        id: 0,
        uuid: String::new(),
        name: String::new(),
        status_id: lookup::STORE_STATUS_DRAFT,
        type_id: None,
        owner_uuid: None,
        supplier_uuid: None,
        square_id: None,
        square_access_token: None,
        size: None,
        contact_phone: None,
        state_of_incorporation: None,
        website: None,
        twitter: None,
        facebook: None,
        instagram: None,
        staff_notes: None,
        image: None,
        created_at: now,
        updated_at: now,
    }
}

async fn company_exists(db: &DatabaseConnection, uuid: &str) -> Result<bool> {
    Ok(Company::find()
        .filter(company::Column::Uuid.eq(uuid))
        .one(db)
        .await?
        .is_some())
}

async fn tags_exist(db: &DatabaseConnection, tags: &[String]) -> Result<bool> {
    let wanted: BTreeSet<&String> = tags.iter().collect();
    if wanted.is_empty() {
        return Ok(true);
    }
    let found = Tag::find()
        .filter(tag::Column::Uuid.is_in(wanted.iter().map(|t| t.as_str())))
        .count(db)
        .await?;
    Ok(found == wanted.len() as u64)
}

fn check_urls(v: &mut Validator, input: &StoreInput) {
    v.url("website", input.website.as_deref())
        .url("twitter", input.twitter.as_deref())
        .url("facebook", input.facebook.as_deref())
        .url("instagram", input.instagram.as_deref());
}

async fn check_references(
    db: &DatabaseConnection,
    v: &mut Validator,
    input: &StoreInput,
) -> Result<()> {
    if let Some(owner_uuid) = input.owner_uuid.as_deref() {
        v.exists("owner_uuid", user::get_user_by_uuid(db, owner_uuid).await?.is_some());
    }
    if let Some(supplier_uuid) = input.supplier_uuid.as_deref() {
        v.exists("supplier_uuid", company_exists(db, supplier_uuid).await?);
    }
    if let Some(tags) = input.tags.as_deref() {
        v.exists("tags", tags_exist(db, tags).await?);
    }
    Ok(())
}

/// What to do with `stores.image`
#[derive(Debug)]
enum ImageChange {
    Keep,
    Clear,
    Replace(crate::storage::DecodedImage),
}

fn image_change(v: &mut Validator, current: Option<&str>, image: Option<&Option<String>>) -> ImageChange {
    match image {
        None => ImageChange::Keep,
        Some(None) => ImageChange::Clear,
        Some(Some(value)) if value.trim().is_empty() => ImageChange::Clear,
        Some(Some(value)) if Some(value.as_str()) == current => ImageChange::Keep,
        Some(Some(value)) => match decode_image(value) {
            Some(decoded) => ImageChange::Replace(decoded),
            None => {
                v.add("image", "The image must be a base64 encoded image.");
                ImageChange::Keep
            }
        },
    }
}

async fn apply_image(
    storage: &Storage,
    store: &store::Model,
    change: ImageChange,
) -> Result<Option<Option<String>>> {
    match change {
        ImageChange::Keep => Ok(None),
        ImageChange::Clear => {
            if let Some(old) = store.image.as_deref() {
                storage.remove(old).await?;
            }
            Ok(Some(None))
        }
        ImageChange::Replace(decoded) => {
            let path = storage.save_store_image(&store.uuid, &decoded).await?;
            if let Some(old) = store.image.as_deref().filter(|old| *old != path) {
                storage.remove(old).await?;
            }
            Ok(Some(Some(path)))
        }
    }
}

/// Replaces the tags of `store_uuid` with `tags`.
pub async fn sync_tags(db: &DatabaseConnection, store_uuid: &str, tags: &[String]) -> Result<()> {
    let unique: BTreeSet<&String> = tags.iter().collect();
    let txn = db.begin().await?;
    StoreTag::delete_many()
        .filter(store_tag::Column::StoreUuid.eq(store_uuid))
        .exec(&txn)
        .await?;
    for tag_uuid in &unique {
        store_tag::ActiveModel {
            store_uuid: Set(store_uuid.to_string()),
            tag_uuid: Set((*tag_uuid).clone()),
        }
        .insert(&txn)
        .await?;
    }
    txn.commit().await?;
    debug!("Synced {} tags on store {}", unique.len(), store_uuid);
    Ok(())
}

/// Tags attached to `store`, ordered by name.
pub async fn get_tags(db: &DatabaseConnection, store: &store::Model) -> Result<Vec<tag::Model>> {
    store
        .find_related(Tag)
        .order_by_asc(tag::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Creates a store. The supplier is always the company of `auth_user`.
///
/// # Errors
/// Returns `Error::Validation` when the name is missing, a reference does not
/// exist, a URL is malformed or the image cannot be decoded.
pub async fn create_store(
    db: &DatabaseConnection,
    storage: &Storage,
    input: StoreInput,
    auth_user: &user_entity::Model,
) -> Result<StoreDetails> {
    let mut v = Validator::new();
    v.required("name", input.name.as_deref());
    check_urls(&mut v, &input);
    check_references(db, &mut v, &input).await?;
    if let Some(type_id) = input.type_id {
        v.exists("type_id", lookup::store_type_exists(db, type_id).await?);
    }
    if let Some(status_id) = input.status_id {
        v.exists("status_id", lookup::store_status_exists(db, status_id).await?);
    }
    let image = image_change(&mut v, None, input.image.as_ref());
    v.finish()?;

    let supplier_uuid = match auth_user.company_uuid.as_deref() {
        Some(uuid) if company_exists(db, uuid).await? => Some(uuid.to_string()),
        _ => None,
    };

    let now = now();
    let mut store = store::ActiveModel {
        uuid: Set(new_uuid()),
        name: Set(input.name.unwrap_or_default()),
        status_id: Set(input.status_id.unwrap_or(lookup::STORE_STATUS_DRAFT)),
        type_id: Set(input.type_id),
        owner_uuid: Set(input.owner_uuid),
        supplier_uuid: Set(supplier_uuid),
        square_id: Set(input.square_id),
        square_access_token: Set(None),
        size: Set(input.size),
        contact_phone: Set(input.contact_phone),
        state_of_incorporation: Set(input.state_of_incorporation),
        website: Set(input.website),
        twitter: Set(input.twitter),
        facebook: Set(input.facebook),
        instagram: Set(input.instagram),
        staff_notes: Set(input.staff_notes),
        image: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    if let Some(path) = apply_image(storage, &store, image).await? {
        let mut active: store::ActiveModel = store.into();
        active.image = Set(path);
        store = active.update(db).await?;
    }

    if let Some(tags) = input.tags.as_deref().filter(|t| !t.is_empty()) {
        sync_tags(db, &store.uuid, tags).await?;
    }

    info!("Created store '{}' ({})", store.name, store.uuid);
    load_details(db, store, StoreIncludes::tags()).await
}

/// Applies the present fields of `input` to the store `uuid`.
///
/// # Errors
/// Returns `Error::NotFound` if the store does not exist and
/// `Error::Validation` for unknown events, tags or references.
pub async fn update_store(
    db: &DatabaseConnection,
    storage: &Storage,
    uuid: &str,
    input: StoreInput,
) -> Result<StoreDetails> {
    let existing = find_store(db, uuid).await?;

    let mut v = Validator::new();
    if input.name.is_some() {
        v.required("name", input.name.as_deref());
    }
    check_urls(&mut v, &input);
    check_references(db, &mut v, &input).await?;
    if let Some(event_uuid) = input.event_uuid.as_deref() {
        v.exists(
            "event_uuid",
            event::get_event_by_uuid(db, event_uuid).await?.is_some(),
        );
    }
    let image = image_change(&mut v, existing.image.as_deref(), input.image.as_ref());
    v.finish()?;

    let image = apply_image(storage, &existing, image).await?;

    let mut store: store::ActiveModel = existing.into();
    if let Some(name) = input.name {
        store.name = Set(name);
    }
    if let Some(status_id) = input.status_id {
        store.status_id = Set(status_id);
    }
    macro_rules! set_present {
        ($($field:ident),*) => {
            $(if input.$field.is_some() {
                store.$field = Set(input.$field);
            })*
        };
    }
    set_present!(
        type_id,
        owner_uuid,
        supplier_uuid,
        square_id,
        size,
        contact_phone,
        state_of_incorporation,
        website,
        twitter,
        facebook,
        instagram,
        staff_notes
    );
    if let Some(path) = image {
        store.image = Set(path);
    }
    store.updated_at = Set(now());
    let store = store.update(db).await?;

    if let Some(tags) = input.tags.as_deref() {
        sync_tags(db, &store.uuid, tags).await?;
    }

    if let (Some(event_uuid), Some(rate), Some(kind)) = (
        input.event_uuid.as_deref().filter(|e| !e.is_empty()),
        input.commission_rate.filter(|r| *r != 0),
        input.commission_type.filter(|t| *t != 0),
    ) {
        event::update_commission(db, &store.uuid, event_uuid, rate, kind).await?;
    }

    info!("Updated store '{}' ({})", store.name, store.uuid);
    load_details(db, store, StoreIncludes::tags()).await
}

/// Deletes the store `uuid` and its image.
///
/// # Errors
/// Returns `Error::NotFound` if the store does not exist and
/// `Error::StoreHasEvents` if it is attached to any event.
pub async fn delete_store(db: &DatabaseConnection, storage: &Storage, uuid: &str) -> Result<()> {
    let store = find_store(db, uuid).await?;
    let events = event::count_events_for_store(db, &store.uuid).await?;
    if events > 0 {
        warn!("Refusing to delete store {} attached to {} events", uuid, events);
        return Err(Error::StoreHasEvents);
    }

    let image = store.image.clone();
    store.delete(db).await?;
    if let Some(image) = image {
        storage.remove(&image).await?;
    }
    info!("Deleted store {}", uuid);
    Ok(())
}

/// Loads the requested relations of `store`.
pub async fn load_details(
    db: &DatabaseConnection,
    store: store::Model,
    includes: StoreIncludes,
) -> Result<StoreDetails> {
    let mut details = StoreDetails::new(store);
    let store = &details.store;

    if includes.tags {
        details.tags = Some(get_tags(db, store).await?);
    }
    if includes.events {
        details.events = Some(event::get_events_for_store(db, &store.uuid).await?);
    }
    if includes.supplier || includes.supplier_admin {
        let supplier = store.find_related(Company).one(db).await?;
        if includes.supplier_admin {
            let admin = match supplier.as_ref() {
                Some(company) => user::get_optional_user(db, company.admin_uuid.as_deref()).await?,
                None => None,
            };
            details.supplier_admin = Some(admin);
        }
        details.supplier = Some(supplier);
    }
    if includes.status {
        details.status = Some(lookup::get_store_status(db, store.status_id).await?);
    }
    if includes.owner {
        details.owner = Some(user::get_optional_user(db, store.owner_uuid.as_deref()).await?);
    }
    if includes.store_type {
        details.store_type = Some(match store.type_id {
            Some(type_id) => lookup::get_store_type(db, type_id).await?,
            None => None,
        });
    }
    if includes.menus {
        details.menus = Some(
            store
                .find_related(MenuItem)
                .order_by_asc(menu_item::Column::Id)
                .all(db)
                .await?,
        );
    }
    if includes.documents {
        details.documents = Some(
            Document::find()
                .filter(document::Column::AssignedType.eq("store"))
                .filter(document::Column::AssignedUuid.eq(store.uuid.as_str()))
                .order_by_asc(document::Column::Id)
                .all(db)
                .await?,
        );
    }
    if includes.events_count {
        details.events_count = Some(event::count_events_for_store(db, &store.uuid).await?);
    }

    Ok(details)
}

/// Loads a store for the detail page.
///
/// # Errors
/// Returns `Error::InvalidQuery` for unknown includes and `Error::NotFound`
/// if the store does not exist.
pub async fn show_store(db: &DatabaseConnection, uuid: &str, query: &ListQuery) -> Result<StoreDetails> {
    query.allow_includes(SHOW_INCLUDES)?;
    let store = find_store(db, uuid).await?;
    load_details(db, store, StoreIncludes::from_query(query)).await
}

/// Store with tags, plus the owner when requested.
///
/// # Errors
/// Returns `Error::InvalidQuery` for unknown includes and `Error::NotFound`
/// if the store does not exist.
pub async fn store_summary(
    db: &DatabaseConnection,
    uuid: &str,
    query: &ListQuery,
) -> Result<StoreDetails> {
    query.allow_includes(SUMMARY_INCLUDES)?;
    let store = find_store(db, uuid).await?;
    let includes = StoreIncludes {
        tags: true,
        owner: query.includes("owner"),
        ..StoreIncludes::default()
    };
    load_details(db, store, includes).await
}

/// Event totals for the store `uuid`.
///
/// # Errors
/// Returns `Error::NotFound` if the store does not exist.
pub async fn service_summary(db: &DatabaseConnection, uuid: &str) -> Result<ServiceSummary> {
    let store = find_store(db, uuid).await?;
    let events = event::get_events_for_store(db, &store.uuid).await?;
    Ok(ServiceSummary {
        counts: event::count_by_schedule(&events),
        store,
    })
}

/// Every store status with the number of stores in it.
pub async fn store_stats(db: &DatabaseConnection) -> Result<Vec<(store_status::Model, u64)>> {
    let counts: HashMap<i32, i64> = Store::find()
        .select_only()
        .column(store::Column::StatusId)
        .column_as(Expr::col(store::Column::Id).count(), "stores_count")
        .group_by(store::Column::StatusId)
        .into_tuple::<(i32, i64)>()
        .all(db)
        .await?
        .into_iter()
        .collect();

    Ok(lookup::get_store_statuses(db)
        .await?
        .into_iter()
        .map(|status| {
            let count = counts.get(&status.id).copied().unwrap_or(0);
            (status, u64::try_from(count).unwrap_or(0))
        })
        .collect())
}

/// Square locations of the store `uuid`. A store without a token and a
/// Square error response both yield an empty list.
///
/// # Errors
/// Returns `Error::NotFound` if the store does not exist and `Error::Square`
/// if Square cannot be reached.
pub async fn store_locations(
    db: &DatabaseConnection,
    square: &dyn LocationsApi,
    uuid: &str,
) -> Result<Vec<Location>> {
    let store = find_store(db, uuid).await?;
    let Some(token) = store.square_access_token.as_deref().filter(|t| !t.is_empty()) else {
        debug!("Store {} has no Square access token", uuid);
        return Ok(Vec::new());
    };

    match square.list_locations(token).await? {
        ListLocations::Success(locations) => Ok(locations),
        ListLocations::Failure(errors) => {
            warn!("Square rejected locations for store {}: {:?}", uuid, errors);
            Ok(Vec::new())
        }
    }
}
