//! Test database setup
#![allow(dead_code)]

use folio::db::create_schema;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Fresh in-memory SQLite database with the full schema.
///
/// A single pooled connection keeps every query on the same in-memory
/// database, so each call returns an isolated, empty store.
pub async fn setup_test_database() -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new("sqlite::memory:".to_owned());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    create_schema(&db).await?;
    Ok(db)
}
