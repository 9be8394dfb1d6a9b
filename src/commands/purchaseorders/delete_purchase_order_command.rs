use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::commands::{Command, CommandContext};
use crate::errors::ServiceError;
use crate::events::Event;

/// Removes an order from the repository. No checks against outstanding
/// receipts are performed; retention of received orders is a caller policy.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeletePurchaseOrderCommand {
    pub id: Uuid,
}

#[async_trait::async_trait]
impl Command for DeletePurchaseOrderCommand {
    type Result = ();

    #[instrument(skip(self, ctx), fields(order_id = %self.id))]
    async fn execute(&self, ctx: &CommandContext) -> Result<Self::Result, ServiceError> {
        ctx.orders.delete(self.id).await?;

        info!(order_id = %self.id, "Purchase order deleted");

        ctx.event_sender
            .send(Event::PurchaseOrderDeleted(self.id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::purchaseorders::{CreatePurchaseOrderCommand, PurchaseOrderItemInput};
    use crate::commands::tests::test_context;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn deleted_orders_disappear_from_lookups() {
        let ctx = test_context();
        let order = CreatePurchaseOrderCommand {
            work_order_id: Uuid::new_v4(),
            vendor_id: Uuid::new_v4(),
            items: vec![PurchaseOrderItemInput {
                description: "paint".to_string(),
                quantity: 4,
                unit_price: dec!(32.00),
            }],
            issue_date: None,
            expected_delivery_date: None,
            notes: None,
        }
        .execute(&ctx)
        .await
        .expect("seed order");

        DeletePurchaseOrderCommand { id: order.id }
            .execute(&ctx)
            .await
            .expect("delete");

        assert!(ctx.orders.find_by_id(order.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn deleting_a_missing_order_is_not_found() {
        let ctx = test_context();
        let result = DeletePurchaseOrderCommand { id: Uuid::new_v4() }
            .execute(&ctx)
            .await;
        assert_matches!(result, Err(ServiceError::NotFound(_)));
    }
}
