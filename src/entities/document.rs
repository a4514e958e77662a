//! Document entity - Contracts, permits and forms that stores or suppliers
//! must sign.
//!
//! The assignee is polymorphic: `assigned_type` names the table (`store`,
//! `company` or `event`) and `assigned_uuid` the row. `signed_at` is set once,
//! when the document is accepted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Document database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    /// Numeric surrogate key
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Public identifier used in routes
    #[sea_orm(unique)]
    pub uuid: String,
    /// Document title
    pub title: String,
    /// See `core::document::DocumentType`
    pub type_id: i32,
    /// See `core::document::DocumentStatus`
    pub status_id: i32,
    /// Instructions shown to the assignee
    #[sea_orm(column_type = "Text")]
    pub description: String,
    /// Internal notes
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    /// When the document stops being valid
    pub expiration_at: Option<DateTime>,
    /// Set when the document is accepted
    pub signed_at: Option<DateTime>,
    /// `store`, `company` or `event`
    pub assigned_type: Option<String>,
    /// Uuid of the assigned row, see `assigned_type`
    pub assigned_uuid: Option<String>,
    /// User who created the document
    pub created_by_uuid: Option<String>,
    /// Template the document was made from
    pub template_uuid: Option<String>,
    /// Event/store association the document belongs to
    pub event_store_uuid: Option<String>,
    /// Creation time
    pub created_at: DateTime,
    /// Last modification time
    pub updated_at: DateTime,
}

/// Defines relationships between Document and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The user who created the document
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedByUuid",
        to = "super::user::Column::Uuid",
        on_delete = "SetNull"
    )]
    Owner,
    /// Template the document was generated from
    #[sea_orm(
        belongs_to = "super::document_template::Entity",
        from = "Column::TemplateUuid",
        to = "super::document_template::Column::Uuid",
        on_delete = "SetNull"
    )]
    Template,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::document_template::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Template.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
