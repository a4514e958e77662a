//! Company entity - Suppliers that own fleets of stores.
//!
//! Companies have members (users whose `company_uuid` points here), teams, tags
//! and an optional admin user.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Company database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "companies")]
pub struct Model {
    /// Numeric surrogate key
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Public identifier used in routes
    #[sea_orm(unique)]
    pub uuid: String,
    /// Display name
    pub name: String,
    /// Legacy numeric status flag
    pub status: i32,
    /// Id into `company_types`
    pub company_type_id: Option<i32>,
    /// Id into `company_statuses`
    pub company_status_id: Option<i32>,
    /// Street address
    pub address: Option<String>,
    /// Second address line
    pub address2: Option<String>,
    /// City
    pub city: Option<String>,
    /// State or region
    pub state: Option<String>,
    /// Postal code
    pub zip: Option<String>,
    /// Country
    pub country: Option<String>,
    /// Company website
    pub website: Option<String>,
    /// Free text notes
    pub notes: Option<String>,
    /// Logo path or URL
    pub logo: Option<String>,
    /// User who administers the company
    pub admin_uuid: Option<String>,
    /// Creation time
    pub created_at: DateTime,
    /// Last modification time
    pub updated_at: DateTime,
}

/// Defines relationships between Company and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The user administering the company
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AdminUuid",
        to = "super::user::Column::Uuid",
        on_delete = "SetNull"
    )]
    Admin,
    /// One company has many teams
    #[sea_orm(has_many = "super::team::Entity")]
    Teams,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Admin.def()
    }
}

impl Related<super::team::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Teams.def()
    }
}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        super::company_tag::Relation::Tag.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::company_tag::Relation::Company.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
