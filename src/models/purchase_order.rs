use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;

/// Closed status set for a purchase order.
///
/// `PartiallyFulfilled` and `Fulfilled` are derived states owned by
/// [`crate::services::order_status::derive_status`]; the remaining variants
/// are set by explicit user action.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PurchaseOrderStatus {
    Draft,
    Sent,
    PartiallyFulfilled,
    Fulfilled,
    Cancelled,
}

impl PurchaseOrderStatus {
    /// Terminal states accept no further manual transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// A purchase order issued against a work order, addressed to a vendor.
///
/// The order exclusively owns its line items and its fulfillment history.
/// `work_order_id` and `vendor_id` are opaque foreign keys; this service does
/// not resolve them against other systems.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PurchaseOrder {
    pub id: Uuid,
    pub po_number: String,
    pub work_order_id: Uuid,
    pub vendor_id: Uuid,
    pub status: PurchaseOrderStatus,
    pub issue_date: Option<NaiveDate>,
    pub expected_delivery_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub items: Vec<PurchaseOrderItem>,
    pub fulfillments: Vec<Fulfillment>,
    /// Set on orders produced by a split; points at the originating order.
    pub split_from_order_id: Option<Uuid>,
    /// Optimistic-concurrency revision, bumped by the repository on save.
    pub revision: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PurchaseOrder {
    /// Sum of `quantity * unit_price` across all line items.
    pub fn total_amount(&self) -> Decimal {
        self.items
            .iter()
            .map(|item| item.unit_price * Decimal::from(item.quantity))
            .sum()
    }

    pub fn item(&self, item_id: Uuid) -> Option<&PurchaseOrderItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    pub fn item_mut(&mut self, item_id: Uuid) -> Option<&mut PurchaseOrderItem> {
        self.items.iter_mut().find(|item| item.id == item_id)
    }
}

/// One line of a purchase order.
///
/// Invariant: `0 <= received_quantity <= quantity`. `quantity` only shrinks
/// through splits and never below `received_quantity`; `received_quantity`
/// only grows through fulfillments.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PurchaseOrderItem {
    pub id: Uuid,
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub received_quantity: i32,
}

impl PurchaseOrderItem {
    /// Quantity still outstanding on this line.
    pub fn remaining(&self) -> i32 {
        self.quantity - self.received_quantity
    }

    pub fn is_fully_received(&self) -> bool {
        self.received_quantity >= self.quantity
    }
}

/// One recorded delivery against an order. Append-only: fulfillments are
/// never edited or removed once recorded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Fulfillment {
    pub id: Uuid,
    pub delivery_date: NaiveDate,
    pub received_by: Option<String>,
    pub notes: Option<String>,
    pub items: Vec<FulfillmentItem>,
    pub recorded_at: DateTime<Utc>,
}

/// Quantity received for a single order line within one delivery.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FulfillmentItem {
    pub order_item_id: Uuid,
    pub quantity_received: i32,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(quantity: i32, unit_price: Decimal, received: i32) -> PurchaseOrderItem {
        PurchaseOrderItem {
            id: Uuid::new_v4(),
            description: "2x4 lumber".to_string(),
            quantity,
            unit_price,
            received_quantity: received,
        }
    }

    #[test]
    fn total_amount_sums_line_values() {
        let order = PurchaseOrder {
            id: Uuid::new_v4(),
            po_number: "PO-00001".to_string(),
            work_order_id: Uuid::new_v4(),
            vendor_id: Uuid::new_v4(),
            status: PurchaseOrderStatus::Draft,
            issue_date: None,
            expected_delivery_date: None,
            notes: None,
            items: vec![item(10, dec!(4.50), 0), item(3, dec!(120.00), 0)],
            fulfillments: vec![],
            split_from_order_id: None,
            revision: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert_eq!(order.total_amount(), dec!(405.00));
    }

    #[test]
    fn remaining_subtracts_received() {
        assert_eq!(item(100, dec!(1), 40).remaining(), 60);
        assert_eq!(item(100, dec!(1), 100).remaining(), 0);
    }

    #[test]
    fn status_round_trips_as_snake_case() {
        let json = serde_json::to_string(&PurchaseOrderStatus::PartiallyFulfilled).unwrap();
        assert_eq!(json, "\"partially_fulfilled\"");
        let parsed: PurchaseOrderStatus =
            "partially_fulfilled".parse().expect("strum parse");
        assert_eq!(parsed, PurchaseOrderStatus::PartiallyFulfilled);
    }
}
