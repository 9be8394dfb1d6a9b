use chrono::{NaiveDate, Utc};
use lazy_static::lazy_static;
use prometheus::IntCounter;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::commands::{Command, CommandContext};
use crate::errors::ServiceError;
use crate::events::Event;
use crate::models::{PurchaseOrder, PurchaseOrderItem, PurchaseOrderStatus};

lazy_static! {
    static ref PO_CREATIONS: IntCounter = IntCounter::new(
        "purchase_order_creations_total",
        "Total number of purchase orders created"
    )
    .expect("metric can be created");
    static ref PO_CREATION_FAILURES: IntCounter = IntCounter::new(
        "purchase_order_creation_failures_total",
        "Total number of failed purchase order creations"
    )
    .expect("metric can be created");
}

fn validate_unit_price(unit_price: &Decimal) -> Result<(), ValidationError> {
    if unit_price.is_sign_negative() {
        return Err(ValidationError::new("unit_price_negative"));
    }
    Ok(())
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreatePurchaseOrderCommand {
    pub work_order_id: Uuid,
    pub vendor_id: Uuid,
    #[validate(length(min = 1, message = "At least one item is required"))]
    pub items: Vec<PurchaseOrderItemInput>,
    pub issue_date: Option<NaiveDate>,
    pub expected_delivery_date: Option<NaiveDate>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct PurchaseOrderItemInput {
    #[validate(length(min = 1, max = 500))]
    pub description: String,
    #[validate(range(min = 1))]
    pub quantity: i32,
    #[validate(custom = "validate_unit_price")]
    pub unit_price: Decimal,
}

#[async_trait::async_trait]
impl Command for CreatePurchaseOrderCommand {
    type Result = PurchaseOrder;

    #[instrument(skip(self, ctx))]
    async fn execute(&self, ctx: &CommandContext) -> Result<Self::Result, ServiceError> {
        self.validate().map_err(|e| {
            PO_CREATION_FAILURES.inc();
            let msg = format!("Invalid input: {}", e);
            error!("{}", msg);
            ServiceError::ValidationError(msg)
        })?;
        for item in &self.items {
            item.validate().map_err(|e| {
                PO_CREATION_FAILURES.inc();
                let msg = format!("Invalid item '{}': {}", item.description, e);
                error!("{}", msg);
                ServiceError::ValidationError(msg)
            })?;
        }

        let po_number = ctx.orders.next_po_number().await?;
        let now = Utc::now();

        let order = PurchaseOrder {
            id: Uuid::new_v4(),
            po_number,
            work_order_id: self.work_order_id,
            vendor_id: self.vendor_id,
            status: PurchaseOrderStatus::Draft,
            issue_date: self.issue_date,
            expected_delivery_date: self.expected_delivery_date,
            notes: self.notes.clone(),
            items: self
                .items
                .iter()
                .map(|item| PurchaseOrderItem {
                    id: Uuid::new_v4(),
                    description: item.description.clone(),
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    received_quantity: 0,
                })
                .collect(),
            fulfillments: vec![],
            split_from_order_id: None,
            revision: 0,
            created_at: now,
            updated_at: now,
        };

        let saved = ctx.orders.insert(order).await.map_err(|e| {
            PO_CREATION_FAILURES.inc();
            e
        })?;

        info!(
            purchase_order_id = %saved.id,
            po_number = %saved.po_number,
            vendor_id = %saved.vendor_id,
            items_count = %saved.items.len(),
            total_amount = %saved.total_amount(),
            "Purchase order created"
        );

        ctx.event_sender
            .send(Event::PurchaseOrderCreated(saved.id))
            .await
            .map_err(|e| {
                PO_CREATION_FAILURES.inc();
                let msg = format!("Failed to send event for created purchase order: {}", e);
                error!("{}", msg);
                ServiceError::EventError(msg)
            })?;

        PO_CREATIONS.inc();

        Ok(saved)
    }
}
