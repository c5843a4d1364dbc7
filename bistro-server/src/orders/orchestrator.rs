//! Order Orchestrator
//!
//! # Pipeline
//!
//! 1. Load the customer and resolve the effective VIP tier
//! 2. Validate items against the menu and snapshot prices
//! 3. Apply tier benefits (discount percentage, complimentary item)
//! 4. Quote the delivery (radius check, fee, ETA) for delivery orders
//! 5. Price the order and estimate cooking time
//! 6. Best-effort table hold for dine-in, with a calendar event
//! 7. Persist the order — the commit point
//! 8. Capture online payment (bounded by a timeout)
//! 9. Accrue loyalty points and re-evaluate VIP qualification
//! 10. Assign a rider (delivery) and send the confirmation SMS
//!
//! Failures before step 7 fail the request and persist nothing. After the
//! commit point only a payment failure surfaces as an error (the order
//! stays pending); every other side-effect failure is appended to the
//! order's diagnostics.

use crate::core::config::Policy;
use crate::db::models::{
    DeliveryType, MenuItem, Order, OrderLine, OrderStatus, PaymentMethod, PaymentStatus,
    TableReservationSnapshot, TableType, User, VipTier,
};
use crate::db::repository::{MenuItemRepository, OrderRepository, UserRepository};
use crate::dispatch::RiderDispatch;
use crate::geo::{DeliveryEstimator, DeliveryQuote};
use crate::loyalty::LoyaltyService;
use crate::pricing;
use crate::services::{
    CalendarSync, PaymentGateway, ReservationEvent, SmsSender, notification::templates,
};
use crate::tables::TableAllocator;
use crate::utils::{self, AppError, ErrorCode};
use std::sync::Arc;
use std::time::Duration;
use surrealdb::RecordId;

/// One requested line of a new order
#[derive(Debug, Clone)]
pub struct OrderItemInput {
    pub menu_item: RecordId,
    pub quantity: i64,
    pub special_instructions: Option<String>,
}

/// Domain-level request for creating an order
#[derive(Debug, Clone)]
pub struct CreateOrderInput {
    pub user_id: RecordId,
    pub items: Vec<OrderItemInput>,
    pub payment_method: PaymentMethod,
    pub delivery_type: DeliveryType,
    pub delivery_address: Option<String>,
    /// Required for VIP dine-in orders (table hold sizing)
    pub party_size: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Clone)]
pub struct OrderOrchestrator {
    orders: OrderRepository,
    users: UserRepository,
    menu: MenuItemRepository,
    allocator: TableAllocator,
    estimator: DeliveryEstimator,
    dispatch: RiderDispatch,
    loyalty: LoyaltyService,
    payment: Arc<dyn PaymentGateway>,
    sms: Arc<dyn SmsSender>,
    calendar: Arc<dyn CalendarSync>,
    policy: Policy,
}

impl OrderOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        orders: OrderRepository,
        users: UserRepository,
        menu: MenuItemRepository,
        allocator: TableAllocator,
        estimator: DeliveryEstimator,
        dispatch: RiderDispatch,
        loyalty: LoyaltyService,
        payment: Arc<dyn PaymentGateway>,
        sms: Arc<dyn SmsSender>,
        calendar: Arc<dyn CalendarSync>,
        policy: Policy,
    ) -> Self {
        Self {
            orders,
            users,
            menu,
            allocator,
            estimator,
            dispatch,
            loyalty,
            payment,
            sms,
            calendar,
            policy,
        }
    }

    /// Validate requested items against the menu and snapshot their prices.
    /// Also returns the preparation time of the slowest item.
    async fn snapshot_items(
        &self,
        items: &[OrderItemInput],
    ) -> Result<(Vec<OrderLine>, i64), AppError> {
        if items.is_empty() {
            return Err(AppError::new(ErrorCode::OrderEmpty));
        }
        let mut lines = Vec::with_capacity(items.len());
        let mut prep_minutes = 0_i64;
        for item in items {
            if item.quantity < 1 {
                return Err(AppError::validation("Quantity must be at least 1"));
            }
            let menu_item = self.menu.find_by_id(&item.menu_item).await.map_err(|_| {
                AppError::with_message(
                    ErrorCode::MenuItemNotFound,
                    format!("Menu item not found: {}", item.menu_item),
                )
            })?;
            if !menu_item.is_available {
                return Err(AppError::with_message(
                    ErrorCode::MenuItemUnavailable,
                    format!("'{}' is not available right now", menu_item.name),
                ));
            }
            prep_minutes = prep_minutes.max(menu_item.preparation_minutes);
            lines.push(OrderLine {
                menu_item: item.menu_item.clone(),
                name: menu_item.name,
                quantity: item.quantity,
                price: menu_item.price,
                special_instructions: item.special_instructions.clone(),
                is_complimentary: false,
            });
        }
        Ok((lines, prep_minutes))
    }

    /// Complimentary item for the tier, if the catalog has a match:
    /// platinum gets the priciest item from the bonus category, gold the
    /// cheapest qualifying drink.
    async fn complimentary_item(&self, tier: VipTier) -> Result<Option<MenuItem>, AppError> {
        let found = match tier {
            VipTier::Platinum => {
                self.menu
                    .find_priciest_in_category(&self.policy.platinum_bonus_category)
                    .await?
            }
            VipTier::Gold => {
                self.menu
                    .find_cheapest_under(
                        &self.policy.gold_bonus_category,
                        self.policy.gold_bonus_price_cap,
                    )
                    .await?
            }
            VipTier::Silver => None,
        };
        Ok(found)
    }

    /// Create an order end to end. See the module docs for the pipeline.
    pub async fn create_order(&self, input: CreateOrderInput) -> Result<Order, AppError> {
        let now = utils::now_millis();

        // 1. Customer and effective tier
        let user = self.users.find_by_id(&input.user_id).await.map_err(|_| {
            AppError::new(ErrorCode::UserNotFound)
        })?;
        let tier = user.effective_tier(now);

        // 2. Items
        let (mut lines, mut prep_minutes) = self.snapshot_items(&input.items).await?;

        // 3. Tier benefits
        if let Some(tier) = tier
            && let Some(bonus) = self.complimentary_item(tier).await?
            && let Some(bonus_id) = bonus.id.clone()
        {
            prep_minutes = prep_minutes.max(bonus.preparation_minutes);
            lines.push(OrderLine {
                menu_item: bonus_id,
                name: bonus.name,
                quantity: 1,
                // Complimentary lines are free; the snapshot price says so
                price: 0.0,
                special_instructions: None,
                is_complimentary: true,
            });
        }

        // 4. Delivery quote (hard fail: out of radius, unmeasurable)
        let quote = self.delivery_quote(&input, tier).await?;

        // 5. Pricing and cooking estimate
        let outcome = pricing::calculate_order_price(&lines, tier, &self.policy)?;
        let delivery_fee = quote.as_ref().map(|q| q.fee).unwrap_or(0.0);
        let total_price = pricing::round2(outcome.total + delivery_fee);
        let cooking_minutes = prep_minutes + 2 * (lines.len() as i64 - 1).max(0);

        // 6. Table hold for VIP dine-in (best-effort) and calendar event
        let mut diagnostics = Vec::new();
        let table_reservation = match (input.delivery_type, tier) {
            (DeliveryType::DineIn, Some(tier)) => {
                self.hold_table(&input, &user, tier, &mut diagnostics).await?
            }
            _ => None,
        };

        let order = Order {
            id: None,
            user: input.user_id.clone(),
            items: lines,
            total_price,
            status: OrderStatus::Pending,
            payment_method: input.payment_method,
            payment_status: PaymentStatus::Pending,
            delivery_type: input.delivery_type,
            delivery_address: input.delivery_address.clone(),
            delivery_fee,
            vip_discount_percent: outcome.discount_percent,
            estimated_cooking_minutes: cooking_minutes,
            estimated_delivery_minutes: quote.as_ref().map(|q| q.eta_minutes),
            transaction_id: None,
            notes: input.notes.clone(),
            table_reservation,
            cancellation: None,
            diagnostics: Vec::new(),
            created_at: now,
        };
        order.validate().map_err(AppError::validation)?;

        // 7. Commit point
        let mut order = self.orders.create(order).await?;
        let order_id = order
            .id
            .clone()
            .ok_or_else(|| AppError::database("Created order missing id"))?;
        tracing::info!(order_id = %order_id, total = total_price, "Order created");

        // 8. Online payment
        if input.payment_method == PaymentMethod::Online {
            self.capture_payment(&order_id, total_price).await?;
        }

        // 9. Loyalty accrual and VIP re-evaluation (best-effort)
        match self.loyalty.accrue(&input.user_id, &order_id, total_price).await {
            Ok((_, points)) => {
                tracing::debug!(order_id = %order_id, points, "Loyalty accrued");
                if let Err(e) = self.loyalty.evaluate_qualification(&input.user_id).await {
                    diagnostics.push(format!("vip evaluation failed: {e}"));
                }
            }
            Err(e) => diagnostics.push(format!("loyalty accrual failed: {e}")),
        }

        // 10a. Rider dispatch for delivery orders (best-effort)
        if input.delivery_type == DeliveryType::Delivery {
            let address = input.delivery_address.as_deref().unwrap_or_default();
            let eta = quote.as_ref().map(|q| q.eta_minutes);
            if let Err(e) = self.dispatch.assign(&order_id, address, eta).await {
                diagnostics.push(format!("rider dispatch failed: {e}"));
            }
        }

        // 10b. Confirmation SMS (best-effort)
        let body = templates::order_confirmed(&order_id.to_string(), total_price, cooking_minutes);
        if let Err(e) = self.sms.send(&user.phone, &body).await {
            diagnostics.push(format!("confirmation sms failed: {e}"));
        }

        if !diagnostics.is_empty() {
            tracing::warn!(order_id = %order_id, ?diagnostics, "Order side effects failed");
            order = self.orders.append_diagnostics(&order_id, diagnostics).await?;
        } else {
            order = self.orders.find_by_id(&order_id).await?;
        }
        Ok(order)
    }

    async fn delivery_quote(
        &self,
        input: &CreateOrderInput,
        tier: Option<VipTier>,
    ) -> Result<Option<DeliveryQuote>, AppError> {
        if input.delivery_type != DeliveryType::Delivery {
            return Ok(None);
        }
        let address = input
            .delivery_address
            .as_deref()
            .filter(|a| !a.trim().is_empty())
            .ok_or_else(|| AppError::validation("Delivery orders need an address"))?;
        Ok(Some(self.estimator.estimate(address, tier).await?))
    }

    /// VIP dine-in only; the tier decides which section is offered
    async fn hold_table(
        &self,
        input: &CreateOrderInput,
        user: &User,
        tier: VipTier,
        diagnostics: &mut Vec<String>,
    ) -> Result<Option<TableReservationSnapshot>, AppError> {
        let party_size = input
            .party_size
            .ok_or_else(|| AppError::validation("Dine-in orders need a party size"))?;
        let table_type = match tier {
            VipTier::Platinum => TableType::PremiumWindowSeat,
            VipTier::Gold | VipTier::Silver => TableType::VipSection,
        };

        let hold = self
            .allocator
            .try_reserve(table_type, party_size, &input.user_id, None)
            .await?;
        let Some(hold) = hold else {
            diagnostics.push("no matching table available".to_string());
            return Ok(None);
        };

        let table_id = hold
            .table
            .id
            .clone()
            .ok_or_else(|| AppError::database("Reserved table missing id"))?;

        // Calendar failure never voids the hold
        let event = ReservationEvent {
            summary: format!("Table {} — {}", hold.table.table_number, user.name),
            description: format!("Party of {party_size}"),
            start_at: hold.reserved_at,
            end_at: hold.release_at,
        };
        if let Err(e) = self.calendar.create_event(&event).await {
            diagnostics.push(format!("calendar event failed: {e}"));
        }

        Ok(Some(TableReservationSnapshot {
            table: table_id,
            table_type: hold.table.table_type,
            reserved_at: hold.reserved_at,
        }))
    }

    /// Charge an online order, bounded by the payment timeout. On any
    /// failure the order is marked failed and the request errors, but the
    /// persisted order survives for retry or manual follow-up.
    async fn capture_payment(&self, order_id: &RecordId, amount: f64) -> Result<(), AppError> {
        let timeout = Duration::from_secs(self.policy.payment_timeout_secs);
        let order_ref = order_id.to_string();
        let charge = self.payment.charge(amount, &order_ref);

        let failure = match tokio::time::timeout(timeout, charge).await {
            Ok(Ok(outcome)) if outcome.success => {
                self.orders
                    .set_payment(order_id, PaymentStatus::Paid, outcome.transaction_id)
                    .await?;
                return Ok(());
            }
            Ok(Ok(outcome)) => outcome
                .decline_reason
                .unwrap_or_else(|| "charge declined".to_string()),
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!("charge timed out after {}s", self.policy.payment_timeout_secs),
        };

        tracing::warn!(order_id = %order_id, reason = %failure, "Payment failed");
        self.orders
            .set_payment(order_id, PaymentStatus::Failed, None)
            .await?;
        Err(AppError::payment_failed(failure))
    }

    /// Cancel an order: refund a captured payment, release any table hold,
    /// notify the customer. Terminal orders cannot be cancelled.
    pub async fn cancel_order(
        &self,
        order_id: &RecordId,
        cancelled_by: &RecordId,
        reason: String,
    ) -> Result<Order, AppError> {
        let order = self.orders.find_by_id(order_id).await.map_err(|_| {
            AppError::new(ErrorCode::OrderNotFound)
        })?;
        match order.status {
            OrderStatus::Completed => {
                return Err(AppError::new(ErrorCode::OrderAlreadyCompleted));
            }
            OrderStatus::Cancelled => {
                return Err(AppError::new(ErrorCode::OrderAlreadyCancelled));
            }
            _ => {}
        }

        let mut diagnostics = Vec::new();

        // Refund a captured charge; a refund failure cancels the order
        // anyway and leaves the money trail in diagnostics
        let mut refunded = false;
        let mut payment_status = order.payment_status;
        if order.payment_status == PaymentStatus::Paid {
            match &order.transaction_id {
                Some(txn) => match self.payment.refund(txn).await {
                    Ok(()) => {
                        refunded = true;
                        payment_status = PaymentStatus::Refunded;
                    }
                    Err(e) => diagnostics.push(format!("refund failed: {e}")),
                },
                None => diagnostics.push("paid order has no transaction id".to_string()),
            }
        }

        if let Some(reservation) = &order.table_reservation
            && let Err(e) = self.allocator.release(&reservation.table).await
        {
            diagnostics.push(format!("table release failed: {e}"));
        }

        let cancellation = crate::db::models::Cancellation {
            reason,
            cancelled_at: utils::now_millis(),
            cancelled_by: cancelled_by.clone(),
            refunded,
        };
        let mut cancelled = self
            .orders
            .set_cancellation(order_id, cancellation, payment_status)
            .await?;
        tracing::info!(order_id = %order_id, refunded, "Order cancelled");

        let user = self.users.find_by_id(&order.user).await?;
        let body = templates::order_cancelled(&order_id.to_string(), refunded);
        if let Err(e) = self.sms.send(&user.phone, &body).await {
            diagnostics.push(format!("cancellation sms failed: {e}"));
        }

        if !diagnostics.is_empty() {
            cancelled = self.orders.append_diagnostics(order_id, diagnostics).await?;
        }
        Ok(cancelled)
    }

    /// Move an order forward through pending → processing → completed.
    /// Transitions never go backwards; cancellation has its own path.
    pub async fn update_order_status(
        &self,
        order_id: &RecordId,
        new_status: OrderStatus,
    ) -> Result<Order, AppError> {
        if new_status == OrderStatus::Cancelled {
            return Err(AppError::invalid_request(
                "Use the cancellation endpoint to cancel an order",
            ));
        }

        let order = self.orders.find_by_id(order_id).await.map_err(|_| {
            AppError::new(ErrorCode::OrderNotFound)
        })?;
        match order.status {
            OrderStatus::Completed => {
                return Err(AppError::new(ErrorCode::OrderAlreadyCompleted));
            }
            OrderStatus::Cancelled => {
                return Err(AppError::new(ErrorCode::OrderAlreadyCancelled));
            }
            current if new_status.rank() <= current.rank() => {
                return Err(AppError::with_message(
                    ErrorCode::OrderStatusConflict,
                    format!("Cannot move order from {current:?} to {new_status:?}"),
                ));
            }
            _ => {}
        }

        let updated = self.orders.set_status(order_id, new_status).await?;
        tracing::info!(order_id = %order_id, status = ?new_status, "Order status updated");

        if new_status == OrderStatus::Completed {
            // Dine-in tables free up when the meal is done
            if let Some(reservation) = &updated.table_reservation
                && let Err(e) = self.allocator.release(&reservation.table).await
            {
                tracing::warn!(order_id = %order_id, error = %e, "Table release failed");
            }
            let user = self.users.find_by_id(&updated.user).await?;
            let body = templates::order_completed(&order_id.to_string());
            if let Err(e) = self.sms.send(&user.phone, &body).await {
                tracing::warn!(order_id = %order_id, error = %e, "Completion SMS failed");
            }
        }

        Ok(updated)
    }
}
