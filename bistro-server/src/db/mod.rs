//! Database Module
//!
//! Embedded SurrealDB (RocksDB engine). One namespace/database pair for the
//! whole service; repositories share the same handle.

pub mod models;
pub mod repository;

use crate::utils::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the on-disk database at `db_path`
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let db: Surreal<Db> = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;
        db.use_ns("bistro")
            .use_db("bistro")
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        Self::define_indexes(&db).await?;

        tracing::info!(path = %db_path, "Database connection established (SurrealDB/RocksDB)");
        Ok(Self { db })
    }

    /// In-memory database for tests
    #[cfg(test)]
    pub async fn open_memory() -> Result<Self, AppError> {
        use surrealdb::engine::local::Mem;

        let db: Surreal<Db> = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::database(format!("Failed to open memory database: {e}")))?;
        db.use_ns("bistro")
            .use_db("bistro")
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;
        Self::define_indexes(&db).await?;
        Ok(Self { db })
    }

    async fn define_indexes(db: &Surreal<Db>) -> Result<(), AppError> {
        db.query(
            "DEFINE INDEX IF NOT EXISTS uniq_table_number \
             ON TABLE dining_table COLUMNS table_number UNIQUE; \
             DEFINE INDEX IF NOT EXISTS uniq_loyalty_user \
             ON TABLE loyalty COLUMNS user UNIQUE;",
        )
        .await
        .map_err(|e| AppError::database(format!("Failed to define indexes: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::MenuItem;
    use crate::db::repository::MenuItemRepository;

    #[tokio::test]
    async fn on_disk_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("database");
        let path = path.to_string_lossy();

        let id = {
            let db = DbService::new(&path).await.unwrap();
            let repo = MenuItemRepository::new(db.db.clone());
            let item = repo
                .create(MenuItem {
                    id: None,
                    name: "Jollof".into(),
                    description: None,
                    price: 12.0,
                    category: "mains".into(),
                    is_available: true,
                    preparation_minutes: 10,
                })
                .await
                .unwrap();
            item.id.unwrap()
        };

        let db = DbService::new(&path).await.unwrap();
        let repo = MenuItemRepository::new(db.db.clone());
        let item = repo.find_by_id(&id).await.unwrap();
        assert_eq!(item.name, "Jollof");
    }
}
