//! Pivot between events and stores carrying the commission terms agreed for
//! that store at that event.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Event/store association
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "event_store")]
pub struct Model {
    /// Event side of the pivot
    #[sea_orm(primary_key, auto_increment = false)]
    pub event_uuid: String,
    /// Store side of the pivot
    #[sea_orm(primary_key, auto_increment = false)]
    pub store_uuid: String,
    /// Identifier referenced by documents attached to this association
    #[sea_orm(unique)]
    pub uuid: String,
    /// Commission amount or percentage, depending on `commission_type`
    pub commission_rate: Option<i32>,
    /// 1 = percentage, 2 = flat fee
    pub commission_type: Option<i32>,
}

/// Both sides of the pivot
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The event side
    #[sea_orm(
        belongs_to = "super::event::Entity",
        from = "Column::EventUuid",
        to = "super::event::Column::Uuid",
        on_delete = "Cascade"
    )]
    Event,
    /// The store side
    #[sea_orm(
        belongs_to = "super::store::Entity",
        from = "Column::StoreUuid",
        to = "super::store::Column::Uuid",
        on_delete = "Cascade"
    )]
    Store,
}

impl ActiveModelBehavior for ActiveModel {}
