//! Database configuration module for Foodfleet.
//!
//! This module handles the `SQLite` connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`. Databases created by an older build are
//! brought up to date by a short list of additive migrations. Each one adds a
//! nullable column and runs only when that column is missing.

use crate::entities::{
    Company, CompanyStatus, CompanyTag, CompanyType, Document, DocumentTemplate, Event,
    EventStore, MenuItem, PaymentType, Store, StoreStatus, StoreTag, StoreType, Tag, Team, User,
    document,
};
use crate::errors::Result;
use sea_orm::sea_query::{ColumnDef, Table, TableAlterStatement};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema, Statement};
use tracing::{debug, info};

/// Establishes a connection to the database at `url`.
pub async fn create_connection(url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to database at {}", url);
    Database::connect(url).await.map_err(Into::into)
}

async fn create_table<E: EntityTrait>(
    db: &DatabaseConnection,
    schema: &Schema,
    entity: E,
) -> Result<()> {
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates all tables that do not exist yet.
///
/// Parents are created before the tables that reference them.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, User).await?;
    create_table(db, &schema, CompanyType).await?;
    create_table(db, &schema, CompanyStatus).await?;
    create_table(db, &schema, Company).await?;
    create_table(db, &schema, Team).await?;
    create_table(db, &schema, Tag).await?;
    create_table(db, &schema, CompanyTag).await?;
    create_table(db, &schema, StoreStatus).await?;
    create_table(db, &schema, StoreType).await?;
    create_table(db, &schema, Store).await?;
    create_table(db, &schema, StoreTag).await?;
    create_table(db, &schema, Event).await?;
    create_table(db, &schema, EventStore).await?;
    create_table(db, &schema, DocumentTemplate).await?;
    create_table(db, &schema, Document).await?;
    create_table(db, &schema, MenuItem).await?;
    create_table(db, &schema, PaymentType).await?;

    info!("Database tables ensured");
    Ok(())
}

/// An additive schema change: one nullable column on an existing table.
struct AddColumn {
    table: &'static str,
    column: &'static str,
    statement: fn() -> TableAlterStatement,
}

fn add_signed_at_to_documents() -> TableAlterStatement {
    Table::alter()
        .table(Document)
        .add_column(ColumnDef::new(document::Column::SignedAt).date_time().null())
        .to_owned()
}

const MIGRATIONS: &[AddColumn] = &[AddColumn {
    table: "documents",
    column: "signed_at",
    statement: add_signed_at_to_documents,
}];

async fn column_exists(db: &DatabaseConnection, table: &str, column: &str) -> Result<bool> {
    let backend = db.get_database_backend();
    let rows = db
        .query_all(Statement::from_string(
            backend,
            format!("PRAGMA table_info({table})"),
        ))
        .await?;
    for row in rows {
        let name: String = row.try_get("", "name")?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Applies every pending additive migration and returns how many ran.
pub async fn run_migrations(db: &DatabaseConnection) -> Result<usize> {
    let builder = db.get_database_backend();
    let mut applied = 0;
    for migration in MIGRATIONS {
        if column_exists(db, migration.table, migration.column).await? {
            debug!(
                "Column {}.{} present, skipping migration",
                migration.table, migration.column
            );
            continue;
        }
        info!("Adding column {}.{}", migration.table, migration.column);
        db.execute(builder.build(&(migration.statement)())).await?;
        applied += 1;
    }
    Ok(applied)
}

/// Connects, creates tables and runs migrations.
pub async fn init_database(url: &str) -> Result<DatabaseConnection> {
    let db = create_connection(url).await?;
    create_tables(&db).await?;
    run_migrations(&db).await?;
    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{document::Model as DocumentModel, store::Model as StoreModel};
    use sea_orm::QuerySelect;

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        let _: Vec<StoreModel> = Store::find().limit(1).all(&db).await?;
        let _: Vec<DocumentModel> = Document::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_migrations_skip_existing_columns() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        assert_eq!(run_migrations(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_signed_at_added_to_legacy_documents() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        db.execute_unprepared(
            "CREATE TABLE documents (id INTEGER PRIMARY KEY AUTOINCREMENT, uuid TEXT NOT NULL, title TEXT NOT NULL)",
        )
        .await?;
        assert!(!column_exists(&db, "documents", "signed_at").await?);

        assert_eq!(run_migrations(&db).await?, 1);
        assert!(column_exists(&db, "documents", "signed_at").await?);
        Ok(())
    }
}
