//! Tag entity - Free-form labels attached to stores and companies.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Tag database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tags")]
pub struct Model {
    /// Numeric surrogate key
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Public identifier used in routes
    #[sea_orm(unique)]
    pub uuid: String,
    /// Tag label
    pub name: String,
}

/// Tags are reached through the pivot tables
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl Related<super::store::Entity> for Entity {
    fn to() -> RelationDef {
        super::store_tag::Relation::Store.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::store_tag::Relation::Tag.def().rev())
    }
}

impl Related<super::company::Entity> for Entity {
    fn to() -> RelationDef {
        super::company_tag::Relation::Company.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::company_tag::Relation::Tag.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
