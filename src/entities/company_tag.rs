//! Pivot between companies and tags.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Company/tag pivot row
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "company_tags")]
pub struct Model {
    /// Tagged company
    #[sea_orm(primary_key, auto_increment = false)]
    pub company_uuid: String,
    /// Applied tag
    #[sea_orm(primary_key, auto_increment = false)]
    pub tag_uuid: String,
}

/// Both sides of the pivot
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The tagged company
    #[sea_orm(
        belongs_to = "super::company::Entity",
        from = "Column::CompanyUuid",
        to = "super::company::Column::Uuid",
        on_delete = "Cascade"
    )]
    Company,
    /// The applied tag
    #[sea_orm(
        belongs_to = "super::tag::Entity",
        from = "Column::TagUuid",
        to = "super::tag::Column::Uuid",
        on_delete = "Cascade"
    )]
    Tag,
}

impl ActiveModelBehavior for ActiveModel {}
