//! Menu item resource.

use super::store::StoreRef;
use crate::core::menu_item::MenuItemDetails;
use serde::Serialize;

/// JSON form of a menu item
#[derive(Debug, Clone, Serialize)]
pub struct MenuItemResource {
    /// Numeric surrogate key
    pub id: i64,
    /// Public identifier used in routes
    pub uuid: String,
    /// Dish name
    pub title: String,
    /// Menu description
    pub description: Option<String>,
    /// Servings per order
    pub servings: Option<i32>,
    /// Cost in cents
    pub cost: Option<i64>,
    /// Store selling the item
    pub store_uuid: String,
    /// Store, with `include=store`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<Option<StoreRef>>,
}

impl From<MenuItemDetails> for MenuItemResource {
    fn from(details: MenuItemDetails) -> Self {
        let item = details.item;
        Self {
            id: item.id,
            uuid: item.uuid,
            title: item.title,
            description: item.description,
            servings: item.servings,
            cost: item.cost,
            store_uuid: item.store_uuid,
            store: details.store.map(|s| s.as_ref().map(StoreRef::from)),
        }
    }
}

impl From<&crate::entities::menu_item::Model> for MenuItemResource {
    fn from(item: &crate::entities::menu_item::Model) -> Self {
        Self::from(MenuItemDetails {
            item: item.clone(),
            store: None,
        })
    }
}
