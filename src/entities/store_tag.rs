//! Pivot between stores and tags. Rows are replaced wholesale on tag sync.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Store/tag pivot row
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "store_tags")]
pub struct Model {
    /// Tagged store
    #[sea_orm(primary_key, auto_increment = false)]
    pub store_uuid: String,
    /// Applied tag
    #[sea_orm(primary_key, auto_increment = false)]
    pub tag_uuid: String,
}

/// Both sides of the pivot
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The tagged store
    #[sea_orm(
        belongs_to = "super::store::Entity",
        from = "Column::StoreUuid",
        to = "super::store::Column::Uuid",
        on_delete = "Cascade"
    )]
    Store,
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
