use crate::models::{PurchaseOrder, PurchaseOrderStatus};

/// Derives the order-level status from item-level fulfillment state.
///
/// Pure function of the current item quantities: `Fulfilled` when every line
/// is fully received, `PartiallyFulfilled` when at least one line has
/// receipts but not all are complete, otherwise the order's current status.
/// It only ever promotes — an order is never moved out of `Draft`, `Sent`,
/// or `Cancelled` by derivation alone.
pub fn derive_status(order: &PurchaseOrder) -> PurchaseOrderStatus {
    if order.items.is_empty() {
        return order.status;
    }

    let all_received = order.items.iter().all(|item| item.is_fully_received());
    if all_received {
        return PurchaseOrderStatus::Fulfilled;
    }

    let any_received = order.items.iter().any(|item| item.received_quantity > 0);
    if any_received {
        return PurchaseOrderStatus::PartiallyFulfilled;
    }

    order.status
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PurchaseOrderItem;
    use chrono::Utc;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn order_with(items: Vec<(i32, i32)>, status: PurchaseOrderStatus) -> PurchaseOrder {
        PurchaseOrder {
            id: Uuid::new_v4(),
            po_number: "PO-00001".to_string(),
            work_order_id: Uuid::new_v4(),
            vendor_id: Uuid::new_v4(),
            status,
            issue_date: None,
            expected_delivery_date: None,
            notes: None,
            items: items
                .into_iter()
                .map(|(quantity, received)| PurchaseOrderItem {
                    id: Uuid::new_v4(),
                    description: "rebar".to_string(),
                    quantity,
                    unit_price: dec!(10),
                    received_quantity: received,
                })
                .collect(),
            fulfillments: vec![],
            split_from_order_id: None,
            revision: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[rstest]
    #[case(vec![(100, 100)], PurchaseOrderStatus::Draft, PurchaseOrderStatus::Fulfilled)]
    #[case(vec![(100, 40)], PurchaseOrderStatus::Draft, PurchaseOrderStatus::PartiallyFulfilled)]
    #[case(vec![(100, 0)], PurchaseOrderStatus::Draft, PurchaseOrderStatus::Draft)]
    #[case(vec![(100, 0)], PurchaseOrderStatus::Sent, PurchaseOrderStatus::Sent)]
    #[case(vec![(100, 0)], PurchaseOrderStatus::Cancelled, PurchaseOrderStatus::Cancelled)]
    #[case(vec![(100, 100), (50, 0)], PurchaseOrderStatus::Sent, PurchaseOrderStatus::PartiallyFulfilled)]
    #[case(vec![(100, 100), (50, 50)], PurchaseOrderStatus::Sent, PurchaseOrderStatus::Fulfilled)]
    fn derivation_truth_table(
        #[case] items: Vec<(i32, i32)>,
        #[case] current: PurchaseOrderStatus,
        #[case] expected: PurchaseOrderStatus,
    ) {
        let order = order_with(items, current);
        assert_eq!(derive_status(&order), expected);
    }

    #[test]
    fn item_reduced_to_received_counts_as_fulfilled() {
        // A split can shrink quantity down to the received amount; the line
        // then reads as complete.
        let order = order_with(vec![(50, 50)], PurchaseOrderStatus::PartiallyFulfilled);
        assert_eq!(derive_status(&order), PurchaseOrderStatus::Fulfilled);
    }

    #[test]
    fn empty_order_keeps_current_status() {
        let order = order_with(vec![], PurchaseOrderStatus::Draft);
        assert_eq!(derive_status(&order), PurchaseOrderStatus::Draft);
    }

    #[test]
    fn derivation_is_idempotent() {
        let order = order_with(vec![(100, 40)], PurchaseOrderStatus::Draft);
        let first = derive_status(&order);
        let second = derive_status(&order);
        assert_eq!(first, second);
    }
}
