use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::commands::{Command, CommandContext};
use crate::errors::ServiceError;
use crate::events::Event;
use crate::models::Vendor;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateVendorCommand {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 200))]
    pub contact_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
}

#[async_trait::async_trait]
impl Command for CreateVendorCommand {
    type Result = Vendor;

    #[instrument(skip(self, ctx))]
    async fn execute(&self, ctx: &CommandContext) -> Result<Self::Result, ServiceError> {
        self.validate()
            .map_err(|e| ServiceError::ValidationError(format!("Invalid input: {}", e)))?;

        let now = Utc::now();
        let vendor = Vendor {
            id: Uuid::new_v4(),
            name: self.name.clone(),
            contact_name: self.contact_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            created_at: now,
            updated_at: now,
        };

        let saved = ctx.vendors.insert(vendor).await?;

        info!(vendor_id = %saved.id, name = %saved.name, "Vendor created");

        ctx.event_sender
            .send(Event::VendorCreated(saved.id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(saved)
    }
}
