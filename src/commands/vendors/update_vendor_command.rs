use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::commands::{Command, CommandContext};
use crate::errors::ServiceError;
use crate::events::Event;
use crate::models::Vendor;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateVendorCommand {
    pub id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
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
impl Command for UpdateVendorCommand {
    type Result = Vendor;

    #[instrument(skip(self, ctx), fields(vendor_id = %self.id))]
    async fn execute(&self, ctx: &CommandContext) -> Result<Self::Result, ServiceError> {
        self.validate()
            .map_err(|e| ServiceError::ValidationError(format!("Invalid input: {}", e)))?;

        let mut vendor = ctx.vendors.find_by_id(self.id).await?.ok_or_else(|| {
            ServiceError::NotFound(format!("Vendor with ID {} not found", self.id))
        })?;

        if let Some(name) = &self.name {
            vendor.name = name.clone();
        }
        if let Some(contact_name) = &self.contact_name {
            vendor.contact_name = Some(contact_name.clone());
        }
        if let Some(email) = &self.email {
            vendor.email = Some(email.clone());
        }
        if let Some(phone) = &self.phone {
            vendor.phone = Some(phone.clone());
        }
        if let Some(address) = &self.address {
            vendor.address = Some(address.clone());
        }

        let saved = ctx.vendors.save(vendor).await?;

        info!(vendor_id = %saved.id, "Vendor updated");

        ctx.event_sender
            .send(Event::VendorUpdated(saved.id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::test_context;
    use crate::commands::vendors::CreateVendorCommand;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn merges_supplied_fields() {
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

        let updated = UpdateVendorCommand {
            id: vendor.id,
            name: None,
            contact_name: Some("L. Osei".to_string()),
            email: None,
            phone: Some("555-0142".to_string()),
            address: None,
        }
        .execute(&ctx)
        .await
        .expect("update vendor");

        assert_eq!(updated.name, "Acme Concrete");
        assert_eq!(updated.contact_name.as_deref(), Some("L. Osei"));
        assert_eq!(updated.phone.as_deref(), Some("555-0142"));
    }

    #[tokio::test]
    async fn missing_vendor_is_not_found() {
        let ctx = test_context();
        let result = UpdateVendorCommand {
            id: Uuid::new_v4(),
            name: None,
            contact_name: None,
            email: None,
            phone: None,
            address: None,
        }
        .execute(&ctx)
        .await;
        assert_matches!(result, Err(ServiceError::NotFound(_)));
    }
}
