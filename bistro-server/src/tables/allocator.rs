//! Table Allocator
//!
//! Reserving picks the smallest available table of the requested type that
//! seats the party. Holds expire after a configured duration; expired holds
//! are swept both lazily (before each reserve) and by the periodic task.

use crate::core::config::Policy;
use crate::db::models::{DiningTable, TableType};
use crate::db::repository::DiningTableRepository;
use crate::utils::{self, AppError, ErrorCode};
use surrealdb::RecordId;

/// A successfully taken hold
#[derive(Debug, Clone)]
pub struct TableHold {
    pub table: DiningTable,
    pub reserved_at: i64,
    pub release_at: i64,
}

#[derive(Clone)]
pub struct TableAllocator {
    repo: DiningTableRepository,
    policy: Policy,
}

impl TableAllocator {
    pub fn new(repo: DiningTableRepository, policy: Policy) -> Self {
        Self { repo, policy }
    }

    /// Attempt to hold a table; `None` means nothing matched (or a racing
    /// request claimed the last match).
    pub async fn try_reserve(
        &self,
        table_type: TableType,
        capacity: i64,
        holder: &RecordId,
        reserved_order: Option<&RecordId>,
    ) -> Result<Option<TableHold>, AppError> {
        if capacity < 1 {
            return Err(AppError::validation("Party size must be at least 1"));
        }

        let now = utils::now_millis();
        // Expired holds count as available; sweep before looking
        self.repo.sweep_expired(now).await?;

        let release_at = now + self.policy.table_hold_minutes * 60_000;
        let table = self
            .repo
            .reserve(table_type, capacity, holder, reserved_order, now, release_at)
            .await?;

        Ok(table.map(|table| TableHold {
            table,
            reserved_at: now,
            release_at,
        }))
    }

    /// Hold a table or fail with `TableUnavailable`
    pub async fn reserve(
        &self,
        table_type: TableType,
        capacity: i64,
        holder: &RecordId,
        reserved_order: Option<&RecordId>,
    ) -> Result<TableHold, AppError> {
        self.try_reserve(table_type, capacity, holder, reserved_order)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::TableUnavailable))
    }

    /// Release a hold; idempotent
    pub async fn release(&self, table_id: &RecordId) -> Result<DiningTable, AppError> {
        self.repo
            .release(table_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::TableNotFound))
    }

    /// Force-release expired holds; returns how many were freed
    pub async fn sweep_expired(&self, now_millis: i64) -> Result<usize, AppError> {
        let freed = self.repo.sweep_expired(now_millis).await?;
        if !freed.is_empty() {
            tracing::info!(count = freed.len(), "Released expired table holds");
        }
        Ok(freed.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::models::{DiningTableCreate, TableLocation};

    async fn setup(tables: &[(i64, TableType, i64)]) -> TableAllocator {
        let db = DbService::open_memory().await.unwrap();
        let repo = DiningTableRepository::new(db.db.clone());
        for (number, table_type, capacity) in tables {
            repo.create(DiningTableCreate {
                table_number: *number,
                table_type: *table_type,
                capacity: *capacity,
                location: TableLocation::Indoor,
            })
            .await
            .unwrap();
        }
        TableAllocator::new(repo, Policy::default())
    }

    fn user(n: u32) -> RecordId {
        format!("user:u{n}").parse().unwrap()
    }

    #[tokio::test]
    async fn reserves_smallest_matching_table() {
        let allocator = setup(&[
            (1, TableType::Regular, 6),
            (2, TableType::Regular, 4),
            (3, TableType::Regular, 2),
        ])
        .await;

        let hold = allocator
            .reserve(TableType::Regular, 3, &user(1), None)
            .await
            .unwrap();
        assert_eq!(hold.table.table_number, 2);
        assert!(!hold.table.is_available);
        assert_eq!(hold.release_at - hold.reserved_at, 120 * 60_000);
    }

    #[tokio::test]
    async fn type_must_match_exactly() {
        let allocator = setup(&[(1, TableType::VipSection, 4)]).await;
        let err = allocator
            .reserve(TableType::Regular, 2, &user(1), None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::TableUnavailable);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_reserves_have_exactly_one_winner() {
        let allocator = setup(&[(1, TableType::Regular, 4)]).await;

        let mut handles = Vec::new();
        for n in 0..8 {
            let allocator = allocator.clone();
            handles.push(tokio::spawn(async move {
                allocator
                    .try_reserve(TableType::Regular, 2, &user(n), None)
                    .await
                    .unwrap()
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap().is_some() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn release_is_idempotent() {
        let allocator = setup(&[(1, TableType::Regular, 4)]).await;
        let hold = allocator
            .reserve(TableType::Regular, 2, &user(1), None)
            .await
            .unwrap();
        let id = hold.table.id.unwrap();

        let released = allocator.release(&id).await.unwrap();
        assert!(released.is_available);
        assert!(released.holder.is_none());

        // Second release is a no-op, not an error
        let released = allocator.release(&id).await.unwrap();
        assert!(released.is_available);
    }

    #[tokio::test]
    async fn sweep_frees_only_expired_holds() {
        let allocator = setup(&[(1, TableType::Regular, 4), (2, TableType::Regular, 4)]).await;
        let hold = allocator
            .reserve(TableType::Regular, 2, &user(1), None)
            .await
            .unwrap();

        // Before expiry nothing is freed
        assert_eq!(allocator.sweep_expired(hold.release_at - 1).await.unwrap(), 0);
        // At expiry the hold is released
        assert_eq!(allocator.sweep_expired(hold.release_at).await.unwrap(), 1);

        let table = allocator
            .reserve(TableType::Regular, 4, &user(2), None)
            .await
            .unwrap();
        assert!(!table.table.is_available);
    }
}
