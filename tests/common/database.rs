//! Test database setup and management
#![allow(dead_code)]

use sea_orm::{DatabaseConnection, DbErr};

/// Opens a private SQLite in-memory database with the full schema.
/// Each test gets its own database, so tests may run in parallel.
pub async fn setup_test_database() -> Result<DatabaseConnection, DbErr> {
    let db = agora::db::connect("sqlite::memory:", 1).await?;
    agora::db::create_schema(&db).await?;
    Ok(db)
}
