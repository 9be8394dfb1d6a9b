use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::commands::purchaseorders::{
    CreatePurchaseOrderCommand, DeletePurchaseOrderCommand, RecordFulfillmentCommand,
    SplitPurchaseOrderCommand, UpdatePurchaseOrderCommand,
};
use crate::commands::{Command, CommandContext};
use crate::errors::ServiceError;
use crate::events::EventSender;
use crate::models::{Fulfillment, PurchaseOrder, PurchaseOrderStatus};
use crate::repositories::{PurchaseOrderRepository, VendorRepository};

/// Service for managing the purchase order lifecycle: creation, delivery
/// recording, and vendor splitting.
#[derive(Clone)]
pub struct PurchaseOrderService {
    ctx: CommandContext,
}

impl PurchaseOrderService {
    pub fn new(
        orders: Arc<dyn PurchaseOrderRepository>,
        vendors: Arc<dyn VendorRepository>,
        event_sender: Arc<EventSender>,
    ) -> Self {
        Self {
            ctx: CommandContext {
                orders,
                vendors,
                event_sender,
            },
        }
    }

    /// Creates a new purchase order in `Draft` status.
    #[instrument(skip(self, command))]
    pub async fn create_order(
        &self,
        command: CreatePurchaseOrderCommand,
    ) -> Result<PurchaseOrder, ServiceError> {
        command.execute(&self.ctx).await
    }

    /// Merges fields into an existing order.
    #[instrument(skip(self, command))]
    pub async fn update_order(
        &self,
        command: UpdatePurchaseOrderCommand,
    ) -> Result<PurchaseOrder, ServiceError> {
        command.execute(&self.ctx).await
    }

    /// Removes an order.
    #[instrument(skip(self))]
    pub async fn delete_order(&self, order_id: Uuid) -> Result<(), ServiceError> {
        DeletePurchaseOrderCommand { id: order_id }
            .execute(&self.ctx)
            .await
    }

    /// Records one delivery against an order, returning the updated order
    /// and the appended fulfillment record.
    #[instrument(skip(self, command))]
    pub async fn record_fulfillment(
        &self,
        command: RecordFulfillmentCommand,
    ) -> Result<(PurchaseOrder, Fulfillment), ServiceError> {
        command.execute(&self.ctx).await
    }

    /// Splits outstanding quantity off to a new order under another vendor,
    /// returning the new order.
    #[instrument(skip(self, command))]
    pub async fn split_order(
        &self,
        command: SplitPurchaseOrderCommand,
    ) -> Result<PurchaseOrder, ServiceError> {
        command.execute(&self.ctx).await
    }

    /// Gets an order by ID.
    #[instrument(skip(self))]
    pub async fn get_order(&self, order_id: Uuid) -> Result<Option<PurchaseOrder>, ServiceError> {
        self.ctx.orders.find_by_id(order_id).await
    }

    /// All orders for a work order, or every order when no filter is given.
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        work_order_id: Option<Uuid>,
    ) -> Result<Vec<PurchaseOrder>, ServiceError> {
        self.ctx.orders.list(work_order_id).await
    }

    /// Orders addressed to one vendor.
    #[instrument(skip(self))]
    pub async fn get_orders_by_vendor(
        &self,
        vendor_id: Uuid,
    ) -> Result<Vec<PurchaseOrder>, ServiceError> {
        self.ctx.orders.find_by_vendor(vendor_id).await
    }

    /// Orders in a given status.
    #[instrument(skip(self))]
    pub async fn get_orders_by_status(
        &self,
        status: PurchaseOrderStatus,
    ) -> Result<Vec<PurchaseOrder>, ServiceError> {
        self.ctx.orders.find_by_status(status).await
    }
}
