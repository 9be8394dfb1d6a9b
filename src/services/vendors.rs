use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::commands::vendors::{CreateVendorCommand, DeleteVendorCommand, UpdateVendorCommand};
use crate::commands::{Command, CommandContext};
use crate::errors::ServiceError;
use crate::events::EventSender;
use crate::models::Vendor;
use crate::repositories::{PurchaseOrderRepository, VendorRepository};

/// Service for vendor administration.
#[derive(Clone)]
pub struct VendorService {
    ctx: CommandContext,
}

impl VendorService {
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

    #[instrument(skip(self, command))]
    pub async fn create_vendor(&self, command: CreateVendorCommand) -> Result<Vendor, ServiceError> {
        command.execute(&self.ctx).await
    }

    #[instrument(skip(self, command))]
    pub async fn update_vendor(&self, command: UpdateVendorCommand) -> Result<Vendor, ServiceError> {
        command.execute(&self.ctx).await
    }

    /// Deletes a vendor; fails with `Conflict` while purchase orders still
    /// reference it.
    #[instrument(skip(self))]
    pub async fn delete_vendor(&self, vendor_id: Uuid) -> Result<(), ServiceError> {
        DeleteVendorCommand { id: vendor_id }
            .execute(&self.ctx)
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_vendor(&self, vendor_id: Uuid) -> Result<Option<Vendor>, ServiceError> {
        self.ctx.vendors.find_by_id(vendor_id).await
    }

    #[instrument(skip(self))]
    pub async fn list_vendors(&self) -> Result<Vec<Vendor>, ServiceError> {
        self.ctx.vendors.list().await
    }
}
