use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::commands::{Command, CommandContext};
use crate::errors::ServiceError;
use crate::events::Event;
use crate::models::{PurchaseOrder, PurchaseOrderStatus};

/// Merges the supplied fields into an existing order.
///
/// Only non-derived status transitions are accepted here; the
/// partially-fulfilled and fulfilled states belong to the fulfillment and
/// split paths.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdatePurchaseOrderCommand {
    pub id: Uuid,
    pub vendor_id: Option<Uuid>,
    pub issue_date: Option<NaiveDate>,
    pub expected_delivery_date: Option<NaiveDate>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
    pub status: Option<PurchaseOrderStatus>,
}

fn apply_status_transition(
    current: PurchaseOrderStatus,
    requested: PurchaseOrderStatus,
) -> Result<PurchaseOrderStatus, ServiceError> {
    use PurchaseOrderStatus::*;

    if requested == current {
        return Ok(current);
    }
    match (current, requested) {
        (_, PartiallyFulfilled) | (_, Fulfilled) => Err(ServiceError::InvalidOperation(format!(
            "Status {} is derived from receipts and cannot be set directly",
            requested
        ))),
        (Cancelled, _) => Err(ServiceError::InvalidOperation(
            "Cancelled orders cannot change status".to_string(),
        )),
        (Draft, Sent) => Ok(Sent),
        (_, Cancelled) => Ok(Cancelled),
        (from, to) => Err(ServiceError::InvalidOperation(format!(
            "Cannot move order from {} to {}",
            from, to
        ))),
    }
}

#[async_trait::async_trait]
impl Command for UpdatePurchaseOrderCommand {
    type Result = PurchaseOrder;

    #[instrument(skip(self, ctx), fields(order_id = %self.id))]
    async fn execute(&self, ctx: &CommandContext) -> Result<Self::Result, ServiceError> {
        self.validate()
            .map_err(|e| ServiceError::ValidationError(format!("Invalid input: {}", e)))?;

        let mut order = ctx.orders.find_by_id(self.id).await?.ok_or_else(|| {
            ServiceError::NotFound(format!("Purchase order with ID {} not found", self.id))
        })?;

        if let Some(vendor_id) = self.vendor_id {
            order.vendor_id = vendor_id;
        }
        if let Some(issue_date) = self.issue_date {
            order.issue_date = Some(issue_date);
        }
        if let Some(expected) = self.expected_delivery_date {
            order.expected_delivery_date = Some(expected);
        }
        if let Some(notes) = &self.notes {
            order.notes = Some(notes.clone());
        }
        if let Some(requested) = self.status {
            order.status = apply_status_transition(order.status, requested)?;
        }

        let saved = ctx.orders.save(order).await?;

        info!(order_id = %saved.id, status = %saved.status, "Purchase order updated");

        ctx.event_sender
            .send(Event::PurchaseOrderUpdated(saved.id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::purchaseorders::{CreatePurchaseOrderCommand, PurchaseOrderItemInput};
    use crate::commands::tests::test_context;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    async fn seeded_order(ctx: &CommandContext) -> PurchaseOrder {
        CreatePurchaseOrderCommand {
            work_order_id: Uuid::new_v4(),
            vendor_id: Uuid::new_v4(),
            items: vec![PurchaseOrderItemInput {
                description: "scaffolding".to_string(),
                quantity: 12,
                unit_price: dec!(55.00),
            }],
            issue_date: None,
            expected_delivery_date: None,
            notes: None,
        }
        .execute(ctx)
        .await
        .expect("seed order")
    }

    fn update(id: Uuid) -> UpdatePurchaseOrderCommand {
        UpdatePurchaseOrderCommand {
            id,
            vendor_id: None,
            issue_date: None,
            expected_delivery_date: None,
            notes: None,
            status: None,
        }
    }

    #[tokio::test]
    async fn merges_fields_and_refreshes_updated_at() {
        let ctx = test_context();
        let order = seeded_order(&ctx).await;

        let cmd = UpdatePurchaseOrderCommand {
            notes: Some("deliver to north gate".to_string()),
            ..update(order.id)
        };
        let saved = cmd.execute(&ctx).await.expect("update");

        assert_eq!(saved.notes.as_deref(), Some("deliver to north gate"));
        assert!(saved.updated_at >= order.updated_at);
        assert_eq!(saved.revision, order.revision + 1);
    }

    #[tokio::test]
    async fn draft_can_be_sent_and_then_cancelled() {
        let ctx = test_context();
        let order = seeded_order(&ctx).await;

        let cmd = UpdatePurchaseOrderCommand {
            status: Some(PurchaseOrderStatus::Sent),
            ..update(order.id)
        };
        let saved = cmd.execute(&ctx).await.expect("send");
        assert_eq!(saved.status, PurchaseOrderStatus::Sent);

        let cmd = UpdatePurchaseOrderCommand {
            status: Some(PurchaseOrderStatus::Cancelled),
            ..update(order.id)
        };
        let saved = cmd.execute(&ctx).await.expect("cancel");
        assert_eq!(saved.status, PurchaseOrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn derived_statuses_cannot_be_set_manually() {
        let ctx = test_context();
        let order = seeded_order(&ctx).await;

        let cmd = UpdatePurchaseOrderCommand {
            status: Some(PurchaseOrderStatus::Fulfilled),
            ..update(order.id)
        };
        assert_matches!(
            cmd.execute(&ctx).await,
            Err(ServiceError::InvalidOperation(_))
        );
    }

    #[tokio::test]
    async fn missing_order_is_not_found() {
        let ctx = test_context();
        assert_matches!(
            update(Uuid::new_v4()).execute(&ctx).await,
            Err(ServiceError::NotFound(_))
        );
    }
}
