//! Payment type entity - Tender types (cash, card, ...) synced from Square.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment type database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_types")]
pub struct Model {
    /// Numeric surrogate key
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Public identifier used in routes
    #[sea_orm(unique)]
    pub uuid: String,
    /// Display name
    pub name: String,
    /// Square tender type, absent for types created locally
    pub square_id: Option<String>,
    /// Creation time
    pub created_at: DateTime,
    /// Last modification time
    pub updated_at: DateTime,
}

/// Payment types have no relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
