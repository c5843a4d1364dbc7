//! Dining Table Repository
//!
//! The reserve path is a compare-and-set inside a single transaction: the
//! candidate lookup and the availability flip commit together, so two
//! concurrent requests for the last matching table cannot both win.

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{DiningTable, DiningTableCreate, TableType};
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct DiningTableRepository {
    base: BaseRepository,
}

impl DiningTableRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, data: DiningTableCreate) -> RepoResult<DiningTable> {
        let table = DiningTable {
            id: None,
            table_number: data.table_number,
            table_type: data.table_type,
            capacity: data.capacity,
            is_available: true,
            holder: None,
            reserved_order: None,
            reserved_at: None,
            release_at: None,
            location: data.location,
        };
        let created: Option<DiningTable> =
            self.base.db().create("dining_table").content(table).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create dining table".to_string()))
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<DiningTable> {
        let table: Option<DiningTable> = self.base.db().select(id.clone()).await?;
        table.ok_or_else(|| RepoError::NotFound(format!("Table not found: {}", id)))
    }

    pub async fn find_all(&self) -> RepoResult<Vec<DiningTable>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM dining_table ORDER BY table_number ASC")
            .await?;
        Ok(result.take(0)?)
    }

    /// Claim the smallest available table of the given type that seats the
    /// party. Returns None when no table matches or another request claimed
    /// the last one first.
    pub async fn reserve(
        &self,
        table_type: TableType,
        capacity: i64,
        holder: &RecordId,
        reserved_order: Option<&RecordId>,
        reserved_at: i64,
        release_at: i64,
    ) -> RepoResult<Option<DiningTable>> {
        let mut result = self
            .base
            .db()
            .query(
                "BEGIN TRANSACTION; \
                 LET $candidates = (SELECT id, capacity, table_number FROM dining_table \
                     WHERE is_available = true \
                       AND table_type = $table_type \
                       AND capacity >= $capacity \
                     ORDER BY capacity ASC, table_number ASC LIMIT 1).id; \
                 UPDATE $candidates SET \
                     is_available = false, \
                     holder = $holder, \
                     reserved_order = $reserved_order, \
                     reserved_at = $reserved_at, \
                     release_at = $release_at \
                     RETURN AFTER; \
                 COMMIT TRANSACTION;",
            )
            .bind(("table_type", table_type))
            .bind(("capacity", capacity))
            .bind(("holder", holder.to_string()))
            .bind(("reserved_order", reserved_order.map(|o| o.to_string())))
            .bind(("reserved_at", reserved_at))
            .bind(("release_at", release_at))
            .await?;
        let tables: Vec<DiningTable> = result.take(1)?;
        Ok(tables.into_iter().next())
    }

    /// Release a hold. Idempotent: releasing an already-available table is
    /// a no-op.
    pub async fn release(&self, id: &RecordId) -> RepoResult<Option<DiningTable>> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $table SET \
                 is_available = true, \
                 holder = NONE, \
                 reserved_order = NONE, \
                 reserved_at = NONE, \
                 release_at = NONE \
                 RETURN AFTER",
            )
            .bind(("table", id.clone()))
            .await?;
        let tables: Vec<DiningTable> = result.take(0)?;
        Ok(tables.into_iter().next())
    }

    /// Force-release every hold whose expiry has passed; returns the tables
    /// that were freed.
    pub async fn sweep_expired(&self, now_millis: i64) -> RepoResult<Vec<DiningTable>> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE dining_table SET \
                 is_available = true, \
                 holder = NONE, \
                 reserved_order = NONE, \
                 reserved_at = NONE, \
                 release_at = NONE \
                 WHERE is_available = false \
                   AND release_at != NONE \
                   AND release_at <= $now \
                 RETURN AFTER",
            )
            .bind(("now", now_millis))
            .await?;
        Ok(result.take(0)?)
    }
}
