//! Global database pool and schema bootstrap

use crate::orm::{article_likes, articles, comments, operators, projects, settings};
use once_cell::sync::OnceCell;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema};

static DB_POOL: OnceCell<DatabaseConnection> = OnceCell::new();

/// Connect to the database and store the pool globally.
///
/// Panics if the connection cannot be established. Calling this twice keeps
/// the first pool.
pub async fn init_db(database_url: String) -> &'static DatabaseConnection {
    if let Some(db) = DB_POOL.get() {
        return db;
    }

    let db = Database::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    if DB_POOL.set(db).is_err() {
        log::debug!("Database pool was initialized concurrently, keeping the first one");
    }

    get_db_pool()
}

/// Returns the global database pool.
///
/// Panics if [`init_db`] has not been called.
pub fn get_db_pool() -> &'static DatabaseConnection {
    DB_POOL.get().expect("Database pool is not initialized")
}

/// Create every table the application needs, skipping the ones that exist.
pub async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_table(db, comments::Entity).await?;
    create_table(db, article_likes::Entity).await?;
    create_table(db, articles::Entity).await?;
    create_table(db, projects::Entity).await?;
    create_table(db, settings::Entity).await?;
    create_table(db, operators::Entity).await?;
    Ok(())
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let mut stmt = Schema::new(backend).create_table_from_entity(entity);
    stmt.if_not_exists();
    db.execute(backend.build(&stmt)).await?;
    Ok(())
}

/// Failure of a storage-layer call.
#[derive(Debug)]
pub enum StoreError {
    /// The addressed row (or one of the addressed rows) does not exist.
    NotFound,
    /// A unique value (such as a slug) is already taken.
    Conflict(String),
    /// The database rejected or failed the query.
    Database(DbErr),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "Record not found"),
            StoreError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            StoreError::Database(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<DbErr> for StoreError {
    fn from(e: DbErr) -> Self {
        StoreError::Database(e)
    }
}
