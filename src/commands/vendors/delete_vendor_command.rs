use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::commands::{Command, CommandContext};
use crate::errors::ServiceError;
use crate::events::Event;

/// Removes a vendor. Vendors referenced by any purchase order cannot be
/// deleted; the conflict names the blocking orders' count so the caller can
/// act on it.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteVendorCommand {
    pub id: Uuid,
}

#[async_trait::async_trait]
impl Command for DeleteVendorCommand {
    type Result = ();

    #[instrument(skip(self, ctx), fields(vendor_id = %self.id))]
    async fn execute(&self, ctx: &CommandContext) -> Result<Self::Result, ServiceError> {
        if ctx.vendors.find_by_id(self.id).await?.is_none() {
            return Err(ServiceError::NotFound(format!(
                "Vendor with ID {} not found",
                self.id
            )));
        }

        let referencing = ctx.orders.find_by_vendor(self.id).await?;
        if !referencing.is_empty() {
            return Err(ServiceError::Conflict(format!(
                "Vendor {} is referenced by {} purchase order(s)",
                self.id,
                referencing.len()
            )));
        }

        ctx.vendors.delete(self.id).await?;

        info!(vendor_id = %self.id, "Vendor deleted");

        ctx.event_sender
            .send(Event::VendorDeleted(self.id))
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
    use crate::commands::vendors::CreateVendorCommand;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn unreferenced_vendor_can_be_deleted() {
        let ctx = test_context();
        let vendor = CreateVendorCommand {
            name: "Acme Concrete".to_string(),
            contact_name: None,
            email: None,
            phone: None,
            address: None,
        }
        .execute(&ctx)
        .await
        .expect("seed vendor");

        DeleteVendorCommand { id: vendor.id }
            .execute(&ctx)
            .await
            .expect("delete vendor");

        assert!(ctx.vendors.find_by_id(vendor.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn referenced_vendor_delete_is_a_conflict() {
        let ctx = test_context();
        let vendor = CreateVendorCommand {
            name: "Acme Concrete".to_string(),
            contact_name: None,
            email: None,
            phone: None,
            address: None,
        }
        .execute(&ctx)
        .await
        .expect("seed vendor");

        CreatePurchaseOrderCommand {
            work_order_id: Uuid::new_v4(),
            vendor_id: vendor.id,
            items: vec![PurchaseOrderItemInput {
                description: "gravel".to_string(),
                quantity: 20,
                unit_price: dec!(18.00),
            }],
            issue_date: None,
            expected_delivery_date: None,
            notes: None,
        }
        .execute(&ctx)
        .await
        .expect("seed order");

        let result = DeleteVendorCommand { id: vendor.id }.execute(&ctx).await;
        assert_matches!(result, Err(ServiceError::Conflict(_)));
        assert!(ctx.vendors.find_by_id(vendor.id).await.unwrap().is_some());
    }
}
