//! Store entity - A vendor (food truck, cart, stand) in the fleet.
//!
//! A store is owned by a user and supplied by a company. It carries tags,
//! menu items and is attached to events through the `event_store` pivot, which
//! holds the per-event commission terms. The Square access token is stored but
//! never serialized.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Store database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stores")]
pub struct Model {
    /// Numeric surrogate key
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Public identifier used in routes
    #[sea_orm(unique)]
    pub uuid: String,
    /// Display name
    pub name: String,
    /// Id into `store_statuses`
    pub status_id: i32,
    /// Id into `store_types`
    pub type_id: Option<i32>,
    /// User who owns the store
    pub owner_uuid: Option<String>,
    /// Company supplying the store
    pub supplier_uuid: Option<String>,
    /// Square merchant id
    pub square_id: Option<String>,
    /// OAuth token for the Square API
    #[serde(skip_serializing)]
    pub square_access_token: Option<String>,
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
    /// Internal notes, not shown to the store
    pub staff_notes: Option<String>,
    /// Storage-relative path of the uploaded image
    pub image: Option<String>,
    /// When the store was created
    pub created_at: DateTime,
    /// When the store was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between Store and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each store may belong to one owner
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerUuid",
        to = "super::user::Column::Uuid",
        on_delete = "SetNull"
    )]
    Owner,
    /// Each store may be supplied by one company
    #[sea_orm(
        belongs_to = "super::company::Entity",
        from = "Column::SupplierUuid",
        to = "super::company::Column::Uuid",
        on_delete = "SetNull"
    )]
    Supplier,
    /// One store has many menu items
    #[sea_orm(has_many = "super::menu_item::Entity")]
    MenuItems,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

impl Related<super::menu_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MenuItems.def()
    }
}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        super::store_tag::Relation::Tag.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::store_tag::Relation::Store.def().rev())
    }
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        super::event_store::Relation::Event.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::event_store::Relation::Store.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
