//! Store status lookup - Workflow states a store moves through (Draft, Pending, ...).
//!
//! Rows use fixed ids seeded from `config.toml`, so `id` is not auto-incremented.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Store status lookup row
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "store_statuses")]
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
