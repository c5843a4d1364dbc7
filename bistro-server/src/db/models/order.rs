//! Order Model
//!
//! Line items embed a price snapshot taken at validation time; the snapshot
//! is immutable even if the catalog price changes later.

use super::dining_table::TableType;
use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Order status (monotonic: pending → processing → completed; cancelled is
/// reached only through cancellation)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Rank used to enforce monotonic transitions
    pub const fn rank(&self) -> u8 {
        match self {
            OrderStatus::Pending => 0,
            OrderStatus::Processing => 1,
            OrderStatus::Completed => 2,
            OrderStatus::Cancelled => 3,
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
    Online,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryType {
    Pickup,
    Delivery,
    DineIn,
}

/// A single order line with price snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    #[serde(with = "serde_helpers::record_id")]
    pub menu_item: RecordId,
    /// Name snapshot for receipts
    pub name: String,
    pub quantity: i64,
    /// Unit price snapshot at validation time
    pub price: f64,
    #[serde(default)]
    pub special_instructions: Option<String>,
    #[serde(default)]
    pub is_complimentary: bool,
}

/// Snapshot of a table hold attached to a dine-in order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableReservationSnapshot {
    #[serde(with = "serde_helpers::record_id")]
    pub table: RecordId,
    pub table_type: TableType,
    /// Epoch millis the hold was taken
    pub reserved_at: i64,
}

/// Cancellation metadata; once present the order is immutable except for
/// the refund flag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cancellation {
    pub reason: String,
    pub cancelled_at: i64,
    #[serde(with = "serde_helpers::record_id")]
    pub cancelled_by: RecordId,
    #[serde(default)]
    pub refunded: bool,
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub user: RecordId,
    pub items: Vec<OrderLine>,
    pub total_price: f64,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub delivery_type: DeliveryType,
    /// Required iff delivery_type is delivery
    #[serde(default)]
    pub delivery_address: Option<String>,
    #[serde(default)]
    pub delivery_fee: f64,
    /// Discount percentage applied from the VIP tier (0 for non-VIP)
    #[serde(default)]
    pub vip_discount_percent: f64,
    #[serde(default)]
    pub estimated_cooking_minutes: i64,
    #[serde(default)]
    pub estimated_delivery_minutes: Option<i64>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub table_reservation: Option<TableReservationSnapshot>,
    #[serde(default)]
    pub cancellation: Option<Cancellation>,
    /// Post-commit side effects that failed (best-effort record, never
    /// surfaced as an error to the caller)
    #[serde(default)]
    pub diagnostics: Vec<String>,
    pub created_at: i64,
}

impl Order {
    /// Schema invariant check run before persistence
    pub fn validate(&self) -> Result<(), String> {
        if self.items.is_empty() {
            return Err("order has no items".into());
        }
        for line in &self.items {
            if line.quantity < 1 {
                return Err(format!("line '{}' has quantity < 1", line.name));
            }
            if !line.price.is_finite() {
                return Err(format!("line '{}' has a non-finite price", line.name));
            }
            if line.price < 0.0 {
                return Err(format!("line '{}' has negative price", line.name));
            }
        }
        if !self.total_price.is_finite() {
            return Err("total price is not finite".into());
        }
        if self.total_price < 0.0 {
            return Err("total price is negative".into());
        }
        let needs_address = self.delivery_type == DeliveryType::Delivery;
        let has_address = self
            .delivery_address
            .as_deref()
            .is_some_and(|a| !a.trim().is_empty());
        if needs_address != has_address {
            return Err("delivery address must be present iff delivery type is delivery".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_order() -> Order {
        Order {
            id: None,
            user: "user:u1".parse().unwrap(),
            items: vec![OrderLine {
                menu_item: "menu_item:m1".parse().unwrap(),
                name: "Jollof".into(),
                quantity: 1,
                price: 12.0,
                special_instructions: None,
                is_complimentary: false,
            }],
            total_price: 12.0,
            status: OrderStatus::Pending,
            payment_method: PaymentMethod::Cash,
            payment_status: PaymentStatus::Pending,
            delivery_type: DeliveryType::Pickup,
            delivery_address: None,
            delivery_fee: 0.0,
            vip_discount_percent: 0.0,
            estimated_cooking_minutes: 10,
            estimated_delivery_minutes: None,
            transaction_id: None,
            notes: None,
            table_reservation: None,
            cancellation: None,
            diagnostics: vec![],
            created_at: 0,
        }
    }

    #[test]
    fn validate_accepts_well_formed_order() {
        assert!(base_order().validate().is_ok());
    }

    #[test]
    fn validate_rejects_address_mismatch() {
        let mut order = base_order();
        order.delivery_type = DeliveryType::Delivery;
        assert!(order.validate().is_err());

        order.delivery_address = Some("12 Oak Street".into());
        assert!(order.validate().is_ok());

        // Address on a pickup order is equally invalid
        order.delivery_type = DeliveryType::Pickup;
        assert!(order.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_lines() {
        let mut order = base_order();
        order.items[0].quantity = 0;
        assert!(order.validate().is_err());

        let mut order = base_order();
        order.items[0].price = -1.0;
        assert!(order.validate().is_err());

        let mut order = base_order();
        order.items.clear();
        assert!(order.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_finite_amounts() {
        let mut order = base_order();
        order.items[0].price = f64::NAN;
        assert!(order.validate().is_err());

        let mut order = base_order();
        order.items[0].price = f64::INFINITY;
        assert!(order.validate().is_err());

        let mut order = base_order();
        order.total_price = f64::NAN;
        assert!(order.validate().is_err());
    }

    #[test]
    fn status_ranks_are_monotonic() {
        assert!(OrderStatus::Pending.rank() < OrderStatus::Processing.rank());
        assert!(OrderStatus::Processing.rank() < OrderStatus::Completed.rank());
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
    }

    #[test]
    fn delivery_type_serde_is_kebab_case() {
        assert_eq!(
            serde_json::to_string(&DeliveryType::DineIn).unwrap(),
            "\"dine-in\""
        );
    }
}
