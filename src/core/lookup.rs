//! Lookup tables (store statuses and types, company types and statuses).
//!
//! These rows have fixed ids that other tables reference, so they are seeded
//! from `config.toml` at startup rather than created through the API. Seeding
//! inserts missing ids and renames existing ones; it never deletes.

use crate::{
    config::settings::{AppConfig, LookupConfig},
    entities::{
        CompanyStatus, CompanyType, StoreStatus, StoreType, company_status, company_type,
        store_status, store_type,
    },
    errors::Result,
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{debug, info};

/// Id of the Draft store status, the default for new stores.
pub const STORE_STATUS_DRAFT: i32 = 1;

macro_rules! upsert_lookup {
    ($db:expr, $rows:expr, $entity:ident, $module:ident) => {{
        let mut written = 0;
        for row in $rows {
            let active = $module::ActiveModel {
                id: Set(row.id),
                name: Set(row.name.clone()),
            };
            if $entity::find_by_id(row.id).one($db).await?.is_some() {
                active.update($db).await?;
            } else {
                active.insert($db).await?;
            }
            written += 1;
        }
        written
    }};
}

/// Seeds every lookup table from the configuration.
///
/// # Errors
/// Returns an error if any insert or update fails.
pub async fn seed_lookups(db: &DatabaseConnection, config: &AppConfig) -> Result<()> {
    let statuses = seed_store_statuses(db, &config.store_statuses).await?;
    let types = upsert_lookup!(db, &config.store_types, StoreType, store_type);
    let company_types = upsert_lookup!(db, &config.company_types, CompanyType, company_type);
    let company_statuses =
        upsert_lookup!(db, &config.company_statuses, CompanyStatus, company_status);
    info!(
        "Seeded lookups: {} store statuses, {} store types, {} company types, {} company statuses",
        statuses, types, company_types, company_statuses
    );
    Ok(())
}

/// Seeds `store_statuses`, returning the number of rows written.
pub async fn seed_store_statuses(db: &DatabaseConnection, rows: &[LookupConfig]) -> Result<usize> {
    let written = upsert_lookup!(db, rows, StoreStatus, store_status);
    debug!("Seeded {} store statuses", written);
    Ok(written)
}

/// All store statuses ordered by id.
pub async fn get_store_statuses(db: &DatabaseConnection) -> Result<Vec<store_status::Model>> {
    StoreStatus::find()
        .order_by_asc(store_status::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// All company types ordered by id.
pub async fn get_company_types(db: &DatabaseConnection) -> Result<Vec<company_type::Model>> {
    CompanyType::find()
        .order_by_asc(company_type::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// All company statuses ordered by id.
pub async fn get_company_statuses(db: &DatabaseConnection) -> Result<Vec<company_status::Model>> {
    CompanyStatus::find()
        .order_by_asc(company_status::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Whether `store_statuses` has `id`.
pub async fn store_status_exists(db: &DatabaseConnection, id: i32) -> Result<bool> {
    Ok(StoreStatus::find_by_id(id).one(db).await?.is_some())
}

/// Whether `store_types` has `id`.
pub async fn store_type_exists(db: &DatabaseConnection, id: i32) -> Result<bool> {
    Ok(StoreType::find_by_id(id).one(db).await?.is_some())
}

/// Loads the store status with `id`.
pub async fn get_store_status(
    db: &DatabaseConnection,
    id: i32,
) -> Result<Option<store_status::Model>> {
    StoreStatus::find_by_id(id).one(db).await.map_err(Into::into)
}

/// Loads the store type with `id`.
pub async fn get_store_type(db: &DatabaseConnection, id: i32) -> Result<Option<store_type::Model>> {
    StoreType::find_by_id(id).one(db).await.map_err(Into::into)
}

/// Loads the company type with `id`.
pub async fn get_company_type(
    db: &DatabaseConnection,
    id: Option<i32>,
) -> Result<Option<company_type::Model>> {
    match id {
        Some(id) => CompanyType::find_by_id(id).one(db).await.map_err(Into::into),
        None => Ok(None),
    }
}

/// Loads the company status with `id`.
pub async fn get_company_status(
    db: &DatabaseConnection,
    id: Option<i32>,
) -> Result<Option<company_status::Model>> {
    match id {
        Some(id) => CompanyStatus::find_by_id(id).one(db).await.map_err(Into::into),
        None => Ok(None),
    }
}
