//! Database pool setup and schema bootstrap.

use crate::orm;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema,
};

/// Opens a connection pool.
///
/// SQLite in-memory databases exist per connection, so they are pinned to a
/// single connection.
pub async fn connect(url: &str, max_connections: u32) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(url.to_owned());
    if url.starts_with("sqlite::memory:") {
        opt.max_connections(1).min_connections(1);
    } else {
        opt.max_connections(max_connections);
    }

    let db = Database::connect(opt).await?;
    log::info!("Connected to database ({:?})", db.get_database_backend());
    Ok(db)
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<(), DbErr>
where
    E: EntityTrait,
{
    let backend = db.get_database_backend();
    let mut stmt = schema.create_table_from_entity(entity);
    stmt.if_not_exists();
    db.execute(backend.build(&stmt)).await?;
    Ok(())
}

/// Creates every table from the entity definitions, parents before children.
pub async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, orm::users::Entity).await?;
    create_table(db, &schema, orm::account_settings::Entity).await?;
    create_table(db, &schema, orm::communities::Entity).await?;
    create_table(db, &schema, orm::ambassadors::Entity).await?;
    create_table(db, &schema, orm::forums::Entity).await?;
    create_table(db, &schema, orm::threads::Entity).await?;
    create_table(db, &schema, orm::posts::Entity).await?;
    create_table(db, &schema, orm::post_votes::Entity).await?;
    create_table(db, &schema, orm::announcements::Entity).await?;
    create_table(db, &schema, orm::events::Entity).await?;
    create_table(db, &schema, orm::connections::Entity).await?;
    create_table(db, &schema, orm::messages::Entity).await?;
    create_table(db, &schema, orm::follows::Entity).await?;
    create_table(db, &schema, orm::notifications::Entity).await?;
    create_table(db, &schema, orm::reports::Entity).await?;

    log::info!("Database schema ready");
    Ok(())
}
