//! Menu item business logic.

use crate::{
    core::{new_uuid, now, store},
    entities::{MenuItem, menu_item, store as store_entity},
    errors::{Error, Result},
    query::{ListQuery, Page, apply_sorts, paginate},
    validation::Validator,
};
use sea_orm::{Condition, Set, prelude::*};
use serde::Deserialize;
use tracing::info;

/// Body accepted by create and update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MenuItemInput {
    /// Dish name, required on create
    pub title: Option<String>,
    /// Menu description
    pub description: Option<String>,
    /// Servings per order
    pub servings: Option<i32>,
    /// Cost in cents
    pub cost: Option<i64>,
    /// Store selling the item, required on create
    pub store_uuid: Option<String>,
}

/// A menu item and, when requested, its store
#[derive(Debug, Clone)]
pub struct MenuItemDetails {
    /// The menu item row
    pub item: menu_item::Model,
    /// Its store
    pub store: Option<Option<store_entity::Model>>,
}

/// Allowed `filter[...]` names
pub const FILTERS: &[&str] = &["uuid", "store_uuid", "title"];
/// Allowed `sort` fields
pub const SORTS: &[&str] = &["title", "cost", "created_at"];
/// Allowed `include` names
pub const INCLUDES: &[&str] = &["store"];

/// Lists menu items with the filters and sorts in `query`.
///
/// # Errors
/// Returns `Error::InvalidQuery` for unknown filters, sorts or includes.
pub async fn list_menu_items(
    db: &DatabaseConnection,
    query: &ListQuery,
) -> Result<Page<menu_item::Model>> {
    query.allow_filters(FILTERS)?;
    query.allow_sorts(SORTS)?;
    query.allow_includes(INCLUDES)?;

    let condition = Condition::all()
        .add_option(query.exact("uuid", menu_item::Column::Uuid))
        .add_option(query.exact("store_uuid", menu_item::Column::StoreUuid))
        .add_option(query.partial("title", menu_item::Column::Title));

    let select = apply_sorts(
        MenuItem::find().filter(condition),
        query,
        &[
            ("title", menu_item::Column::Title),
            ("cost", menu_item::Column::Cost),
            ("created_at", menu_item::Column::CreatedAt),
        ],
        menu_item::Column::Id,
    );
    paginate(db, select, query.page()).await
}

/// Finds a menu item by uuid or fails with `Error::NotFound`.
pub async fn find_menu_item(db: &DatabaseConnection, uuid: &str) -> Result<menu_item::Model> {
    MenuItem::find()
        .filter(menu_item::Column::Uuid.eq(uuid))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("menu item", uuid))
}

/// Creates a menu item on an existing store.
///
/// # Errors
/// Returns `Error::Validation` if the title or store is missing or the store
/// does not exist.
pub async fn create_menu_item(
    db: &DatabaseConnection,
    input: MenuItemInput,
) -> Result<menu_item::Model> {
    let mut v = Validator::new();
    v.required("title", input.title.as_deref())
        .required("store_uuid", input.store_uuid.as_deref());
    if let Some(store_uuid) = input.store_uuid.as_deref().filter(|s| !s.trim().is_empty()) {
        v.exists(
            "store_uuid",
            store::get_store_by_uuid(db, store_uuid).await?.is_some(),
        );
    }
    v.finish()?;

    let now = now();
    let item = menu_item::ActiveModel {
        uuid: Set(new_uuid()),
        title: Set(input.title.unwrap_or_default()),
        description: Set(input.description),
        servings: Set(input.servings),
        cost: Set(input.cost),
        store_uuid: Set(input.store_uuid.unwrap_or_default()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Created menu item '{}' for store {}", item.title, item.store_uuid);
    Ok(item)
}

/// Applies the present fields of `input` to the menu item `uuid`.
///
/// # Errors
/// Returns `Error::NotFound` if the item does not exist and
/// `Error::Validation` for a blank title or unknown store.
pub async fn update_menu_item(
    db: &DatabaseConnection,
    uuid: &str,
    input: MenuItemInput,
) -> Result<menu_item::Model> {
    let existing = find_menu_item(db, uuid).await?;

    let mut v = Validator::new();
    if input.title.is_some() {
        v.required("title", input.title.as_deref());
    }
    if let Some(store_uuid) = input.store_uuid.as_deref() {
        v.exists(
            "store_uuid",
            store::get_store_by_uuid(db, store_uuid).await?.is_some(),
        );
    }
    v.finish()?;

    let mut item: menu_item::ActiveModel = existing.into();
    if let Some(title) = input.title {
        item.title = Set(title);
    }
    if input.description.is_some() {
        item.description = Set(input.description);
    }
    if input.servings.is_some() {
        item.servings = Set(input.servings);
    }
    if input.cost.is_some() {
        item.cost = Set(input.cost);
    }
    if let Some(store_uuid) = input.store_uuid {
        item.store_uuid = Set(store_uuid);
    }
    item.updated_at = Set(now());
    item.update(db).await.map_err(Into::into)
}

/// Deletes the menu item `uuid`.
///
/// # Errors
/// Returns `Error::NotFound` if the item does not exist.
pub async fn delete_menu_item(db: &DatabaseConnection, uuid: &str) -> Result<()> {
    find_menu_item(db, uuid).await?.delete(db).await?;
    info!("Deleted menu item {}", uuid);
    Ok(())
}

/// Loads the store when `with_store` is set.
pub async fn load_details(
    db: &DatabaseConnection,
    item: menu_item::Model,
    with_store: bool,
) -> Result<MenuItemDetails> {
    let store = if with_store {
        Some(store::get_store_by_uuid(db, &item.store_uuid).await?)
    } else {
        None
    };
    Ok(MenuItemDetails { item, store })
}
