//! Event entity - Festivals, markets and catering gigs that stores attend.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Event database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "events")]
pub struct Model {
    /// Numeric surrogate key
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Public identifier used in routes
    #[sea_orm(unique)]
    pub uuid: String,
    /// Event name
    pub name: String,
    /// Event status
    pub status_id: i32,
    /// Event type
    pub type_id: Option<i32>,
    /// Scheduled start
    pub start_at: Option<DateTime>,
    /// Scheduled end
    pub end_at: Option<DateTime>,
    /// Creation time
    pub created_at: DateTime,
    /// Last modification time
    pub updated_at: DateTime,
}

/// Events are reached through `event_store`
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl Related<super::store::Entity> for Entity {
    fn to() -> RelationDef {
        super::event_store::Relation::Store.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::event_store::Relation::Event.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
