//! Document template entity - Reusable bodies documents can be generated from.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Template a document can be created from
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "document_templates")]
pub struct Model {
    /// Numeric surrogate key
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Public identifier used in routes
    #[sea_orm(unique)]
    pub uuid: String,
    /// Template title
    pub title: String,
    /// Short description
    pub description: Option<String>,
    /// Template body
    #[sea_orm(column_type = "Text", nullable)]
    pub content: Option<String>,
}

/// Templates are only referenced, never navigated from
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
