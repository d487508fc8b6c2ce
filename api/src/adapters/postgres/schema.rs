//! Table bootstrap
//!
//! Creates the tables the adapters need when they are missing.

use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait, Schema};

use crate::entity::{comments, distributed_locks, posts, users};
use crate::error::DomainError;

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<(), DomainError> {
    let backend = db.get_database_backend();
    let mut statement = Schema::new(backend).create_table_from_entity(entity);
    statement.if_not_exists();

    db.execute(backend.build(&statement))
        .await
        .map_err(|e| DomainError::Database(e.to_string()))?;
    Ok(())
}

/// Create every table used by the PostgreSQL adapters if it does not exist
pub async fn ensure_schema(db: &DatabaseConnection) -> Result<(), DomainError> {
    create_table(db, users::Entity).await?;
    create_table(db, posts::Entity).await?;
    create_table(db, comments::Entity).await?;
    create_table(db, distributed_locks::Entity).await?;

    tracing::info!("Database schema ready");
    Ok(())
}
