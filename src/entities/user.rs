//! User entity - People who log in and own stores or documents.
//!
//! A user may belong to a company (the store supplier). API access is granted
//! by matching the bearer token against `api_token`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Numeric surrogate key
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Public identifier
    #[sea_orm(unique)]
    pub uuid: String,
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
    /// Company the user works for
    pub company_uuid: Option<String>,
    /// Bearer token accepted by the API
    #[serde(skip_serializing)]
    #[sea_orm(unique)]
    pub api_token: String,
    /// When the user was created
    pub created_at: DateTime,
    /// When the user was last modified
    pub updated_at: DateTime,
}

/// Users are reached from the rows that point at them
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
