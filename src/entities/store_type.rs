//! Store type lookup - Kind of vendor (food truck, cart, ...).
//!
//! Rows use fixed ids seeded from `config.toml`, so `id` is not auto-incremented.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Store type lookup row
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "store_types")]
pub struct Model {
    /// Fixed id from the lookup config
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    /// Label shown in the UI
    pub name: String,
}

/// Lookup rows have no relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
