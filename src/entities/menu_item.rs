//! Menu item entity - Dishes a store sells, with servings and unit cost.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Menu item database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "menu_items")]
pub struct Model {
    /// Numeric surrogate key
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Public identifier used in routes
    #[sea_orm(unique)]
    pub uuid: String,
    /// Dish name
    pub title: String,
    /// Menu description
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    /// Servings per order
    pub servings: Option<i32>,
    /// Cost in cents
    pub cost: Option<i64>,
    /// Store selling the item
    pub store_uuid: String,
    /// Creation time
    pub created_at: DateTime,
    /// Last modification time
    pub updated_at: DateTime,
}

/// Defines relationships between MenuItem and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each menu item belongs to one store
    #[sea_orm(
        belongs_to = "super::store::Entity",
        from = "Column::StoreUuid",
        to = "super::store::Column::Uuid",
        on_delete = "Cascade"
    )]
    Store,
}

impl Related<super::store::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Store.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
