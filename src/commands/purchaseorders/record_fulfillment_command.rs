use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use lazy_static::lazy_static;
use prometheus::IntCounter;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::commands::{Command, CommandContext};
use crate::errors::ServiceError;
use crate::events::Event;
use crate::models::{Fulfillment, FulfillmentItem, PurchaseOrder};
use crate::services::order_status::derive_status;

lazy_static! {
    static ref FULFILLMENTS_RECORDED: IntCounter = IntCounter::new(
        "purchase_order_fulfillments_total",
        "Total number of fulfillments recorded against purchase orders"
    )
    .expect("metric can be created");
    static ref FULFILLMENT_FAILURES: IntCounter = IntCounter::new(
        "purchase_order_fulfillment_failures_total",
        "Total number of rejected fulfillment submissions"
    )
    .expect("metric can be created");
}

/// Records one delivery against an order.
///
/// Not idempotent by design: submitting the same payload twice double-counts
/// receipts. Callers are responsible for not resubmitting.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RecordFulfillmentCommand {
    pub order_id: Uuid,
    pub delivery_date: NaiveDate,
    #[validate(length(max = 200))]
    pub received_by: Option<String>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
    pub items: Vec<FulfillmentItemInput>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FulfillmentItemInput {
    pub order_item_id: Uuid,
    pub quantity_received: i32,
    pub notes: Option<String>,
}

/// Keeps only positive entries, aggregated per order item. Zero quantities
/// are silently discarded; negative quantities are rejected.
fn effective_quantities(
    items: &[FulfillmentItemInput],
) -> Result<HashMap<Uuid, i32>, ServiceError> {
    let mut totals: HashMap<Uuid, i32> = HashMap::new();
    for entry in items {
        if entry.quantity_received < 0 {
            return Err(ServiceError::ValidationError(format!(
                "Quantity for item {} must be positive",
                entry.order_item_id
            )));
        }
        if entry.quantity_received == 0 {
            continue;
        }
        *totals.entry(entry.order_item_id).or_insert(0) += entry.quantity_received;
    }
    Ok(totals)
}

fn validate_against_order(
    order: &PurchaseOrder,
    totals: &HashMap<Uuid, i32>,
) -> Result<(), ServiceError> {
    for (item_id, requested) in totals {
        let item = order.item(*item_id).ok_or_else(|| {
            ServiceError::ValidationError(format!("Unknown item {} on order {}", item_id, order.id))
        })?;
        let remaining = item.remaining();
        if *requested > remaining {
            return Err(ServiceError::ValidationError(format!(
                "Quantity {} for item '{}' exceeds remaining {}",
                requested, item.description, remaining
            )));
        }
    }
    Ok(())
}

#[async_trait::async_trait]
impl Command for RecordFulfillmentCommand {
    type Result = (PurchaseOrder, Fulfillment);

    #[instrument(skip(self, ctx), fields(order_id = %self.order_id))]
    async fn execute(&self, ctx: &CommandContext) -> Result<Self::Result, ServiceError> {
        self.validate().map_err(|e| {
            FULFILLMENT_FAILURES.inc();
            ServiceError::ValidationError(format!("Invalid input: {}", e))
        })?;

        let mut order = ctx
            .orders
            .find_by_id(self.order_id)
            .await?
            .ok_or_else(|| {
                FULFILLMENT_FAILURES.inc();
                ServiceError::NotFound(format!(
                    "Purchase order with ID {} not found",
                    self.order_id
                ))
            })?;

        // Validate every line before mutating anything: a rejected
        // submission must leave all received quantities untouched.
        let totals = effective_quantities(&self.items).map_err(|e| {
            FULFILLMENT_FAILURES.inc();
            e
        })?;
        if totals.is_empty() {
            FULFILLMENT_FAILURES.inc();
            return Err(ServiceError::ValidationError(
                "No quantities provided".to_string(),
            ));
        }
        validate_against_order(&order, &totals).map_err(|e| {
            FULFILLMENT_FAILURES.inc();
            error!(order_id = %self.order_id, "fulfillment rejected: {}", e);
            e
        })?;

        for (item_id, requested) in &totals {
            if let Some(item) = order.item_mut(*item_id) {
                item.received_quantity += requested;
            }
        }

        let fulfillment = Fulfillment {
            id: Uuid::new_v4(),
            delivery_date: self.delivery_date,
            received_by: self.received_by.clone(),
            notes: self.notes.clone(),
            items: self
                .items
                .iter()
                .filter(|entry| entry.quantity_received > 0)
                .map(|entry| FulfillmentItem {
                    order_item_id: entry.order_item_id,
                    quantity_received: entry.quantity_received,
                    notes: entry.notes.clone(),
                })
                .collect(),
            recorded_at: Utc::now(),
        };
        order.fulfillments.push(fulfillment.clone());
        order.status = derive_status(&order);

        let saved = ctx.orders.save(order).await.map_err(|e| {
            FULFILLMENT_FAILURES.inc();
            e
        })?;

        info!(
            order_id = %saved.id,
            fulfillment_id = %fulfillment.id,
            lines = %fulfillment.items.len(),
            status = %saved.status,
            "Fulfillment recorded"
        );

        ctx.event_sender
            .send(Event::FulfillmentRecorded {
                order_id: saved.id,
                fulfillment_id: fulfillment.id,
            })
            .await
            .map_err(ServiceError::EventError)?;

        FULFILLMENTS_RECORDED.inc();

        Ok((saved, fulfillment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::purchaseorders::{CreatePurchaseOrderCommand, PurchaseOrderItemInput};
    use crate::commands::tests::test_context;
    use crate::models::PurchaseOrderStatus;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    async fn seeded_order(ctx: &CommandContext, quantity: i32) -> PurchaseOrder {
        CreatePurchaseOrderCommand {
            work_order_id: Uuid::new_v4(),
            vendor_id: Uuid::new_v4(),
            items: vec![PurchaseOrderItemInput {
                description: "drywall sheets".to_string(),
                quantity,
                unit_price: dec!(8.25),
            }],
            issue_date: None,
            expected_delivery_date: None,
            notes: None,
        }
        .execute(ctx)
        .await
        .expect("seed order")
    }

    fn delivery(order: &PurchaseOrder, quantity: i32) -> RecordFulfillmentCommand {
        RecordFulfillmentCommand {
            order_id: order.id,
            delivery_date: NaiveDate::from_ymd_opt(2026, 8, 6).unwrap(),
            received_by: Some("J. Alvarez".to_string()),
            notes: None,
            items: vec![FulfillmentItemInput {
                order_item_id: order.items[0].id,
                quantity_received: quantity,
                notes: None,
            }],
        }
    }

    #[tokio::test]
    async fn partial_then_full_delivery_promotes_status() {
        let ctx = test_context();
        let order = seeded_order(&ctx, 100).await;

        let (order, _) = delivery(&order, 40).execute(&ctx).await.expect("partial");
        assert_eq!(order.items[0].received_quantity, 40);
        assert_eq!(order.status, PurchaseOrderStatus::PartiallyFulfilled);

        let (order, _) = delivery(&order, 60).execute(&ctx).await.expect("final");
        assert_eq!(order.items[0].received_quantity, 100);
        assert_eq!(order.status, PurchaseOrderStatus::Fulfilled);
        assert_eq!(order.fulfillments.len(), 2);
    }

    #[tokio::test]
    async fn over_delivery_is_rejected_without_mutation() {
        let ctx = test_context();
        let order = seeded_order(&ctx, 100).await;
        let (order, _) = delivery(&order, 40).execute(&ctx).await.expect("partial");

        let result = delivery(&order, 70).execute(&ctx).await;
        assert_matches!(result, Err(ServiceError::ValidationError(msg)) if msg.contains("exceeds remaining"));

        let reread = ctx.orders.find_by_id(order.id).await.unwrap().unwrap();
        assert_eq!(reread.items[0].received_quantity, 40);
        assert_eq!(reread.fulfillments.len(), 1);
        assert_eq!(reread.status, PurchaseOrderStatus::PartiallyFulfilled);
    }

    #[tokio::test]
    async fn all_zero_quantities_are_rejected() {
        let ctx = test_context();
        let order = seeded_order(&ctx, 10).await;

        let result = delivery(&order, 0).execute(&ctx).await;
        assert_matches!(result, Err(ServiceError::ValidationError(msg)) if msg.contains("No quantities provided"));

        let reread = ctx.orders.find_by_id(order.id).await.unwrap().unwrap();
        assert!(reread.fulfillments.is_empty());
    }

    #[tokio::test]
    async fn unknown_item_is_rejected() {
        let ctx = test_context();
        let order = seeded_order(&ctx, 10).await;

        let cmd = RecordFulfillmentCommand {
            order_id: order.id,
            delivery_date: NaiveDate::from_ymd_opt(2026, 8, 6).unwrap(),
            received_by: None,
            notes: None,
            items: vec![FulfillmentItemInput {
                order_item_id: Uuid::new_v4(),
                quantity_received: 1,
                notes: None,
            }],
        };

        assert_matches!(
            cmd.execute(&ctx).await,
            Err(ServiceError::ValidationError(msg)) if msg.contains("Unknown item")
        );
    }

    #[tokio::test]
    async fn duplicate_lines_for_one_item_are_validated_in_aggregate() {
        let ctx = test_context();
        let order = seeded_order(&ctx, 10).await;

        let cmd = RecordFulfillmentCommand {
            order_id: order.id,
            delivery_date: NaiveDate::from_ymd_opt(2026, 8, 6).unwrap(),
            received_by: None,
            notes: None,
            items: vec![
                FulfillmentItemInput {
                    order_item_id: order.items[0].id,
                    quantity_received: 6,
                    notes: None,
                },
                FulfillmentItemInput {
                    order_item_id: order.items[0].id,
                    quantity_received: 6,
                    notes: None,
                },
            ],
        };

        assert_matches!(
            cmd.execute(&ctx).await,
            Err(ServiceError::ValidationError(msg)) if msg.contains("exceeds remaining")
        );
    }
}
