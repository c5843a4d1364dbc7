//! Order Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Cancellation, Order, OrderStatus, PaymentStatus};
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, order: Order) -> RepoResult<Order> {
        let created: Option<Order> = self.base.db().create("orders").content(order).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Order> {
        let order: Option<Order> = self.base.db().select(id.clone()).await?;
        order.ok_or_else(|| RepoError::NotFound(format!("Order not found: {}", id)))
    }

    pub async fn find_by_user(&self, user_id: &RecordId) -> RepoResult<Vec<Order>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM orders WHERE user = $user ORDER BY created_at DESC")
            .bind(("user", user_id.to_string()))
            .await?;
        Ok(result.take(0)?)
    }

    pub async fn set_status(&self, id: &RecordId, status: OrderStatus) -> RepoResult<Order> {
        let mut result = self
            .base
            .db()
            .query("UPDATE $order_id SET status = $status RETURN AFTER")
            .bind(("order_id", id.clone()))
            .bind(("status", status))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        orders
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Order not found: {}", id)))
    }

    pub async fn set_payment(
        &self,
        id: &RecordId,
        status: PaymentStatus,
        transaction_id: Option<String>,
    ) -> RepoResult<Order> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $order_id SET \
                 payment_status = $payment_status, \
                 transaction_id = $transaction_id \
                 RETURN AFTER",
            )
            .bind(("order_id", id.clone()))
            .bind(("payment_status", status))
            .bind(("transaction_id", transaction_id))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        orders
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Order not found: {}", id)))
    }

    /// Append side-effect failure notes accumulated after the commit point
    pub async fn append_diagnostics(&self, id: &RecordId, notes: Vec<String>) -> RepoResult<Order> {
        let mut result = self
            .base
            .db()
            .query("UPDATE $order_id SET diagnostics += $notes RETURN AFTER")
            .bind(("order_id", id.clone()))
            .bind(("notes", notes))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        orders
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Order not found: {}", id)))
    }

    pub async fn set_cancellation(
        &self,
        id: &RecordId,
        cancellation: Cancellation,
        payment_status: PaymentStatus,
    ) -> RepoResult<Order> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $order_id SET \
                 status = $status, \
                 cancellation = $cancellation, \
                 payment_status = $payment_status \
                 RETURN AFTER",
            )
            .bind(("order_id", id.clone()))
            .bind(("status", OrderStatus::Cancelled))
            .bind(("cancellation", cancellation))
            .bind(("payment_status", payment_status))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        orders
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Order not found: {}", id)))
    }
}
