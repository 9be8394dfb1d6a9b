use std::collections::HashMap;

use chrono::Utc;
use lazy_static::lazy_static;
use prometheus::IntCounter;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::commands::{Command, CommandContext};
use crate::errors::ServiceError;
use crate::events::Event;
use crate::models::{PurchaseOrder, PurchaseOrderItem, PurchaseOrderStatus};
use crate::services::order_status::derive_status;

lazy_static! {
    static ref PO_SPLITS: IntCounter = IntCounter::new(
        "purchase_order_splits_total",
        "Total number of purchase orders split to a new vendor"
    )
    .expect("metric can be created");
    static ref PO_SPLIT_FAILURES: IntCounter = IntCounter::new(
        "purchase_order_split_failures_total",
        "Total number of rejected split submissions"
    )
    .expect("metric can be created");
}

/// Moves outstanding quantity from an existing order to a brand-new order
/// under a different vendor. The split input is transient: only the two
/// resulting orders persist, the new one carrying a back-reference to the
/// original.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SplitPurchaseOrderCommand {
    pub order_id: Uuid,
    pub new_vendor_id: Uuid,
    pub items: Vec<SplitItemInput>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SplitItemInput {
    pub order_item_id: Uuid,
    pub quantity: i32,
}

fn effective_quantities(items: &[SplitItemInput]) -> Result<HashMap<Uuid, i32>, ServiceError> {
    let mut totals: HashMap<Uuid, i32> = HashMap::new();
    for entry in items {
        if entry.quantity < 0 {
            return Err(ServiceError::ValidationError(format!(
                "Quantity for item {} must be positive",
                entry.order_item_id
            )));
        }
        if entry.quantity == 0 {
            continue;
        }
        *totals.entry(entry.order_item_id).or_insert(0) += entry.quantity;
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
        // Quantity already received cannot move to another vendor.
        let available = item.quantity - item.received_quantity;
        if *requested > available {
            return Err(ServiceError::ValidationError(format!(
                "Quantity {} for item '{}' exceeds available {}",
                requested, item.description, available
            )));
        }
    }
    Ok(())
}

#[async_trait::async_trait]
impl Command for SplitPurchaseOrderCommand {
    type Result = PurchaseOrder;

    #[instrument(skip(self, ctx), fields(order_id = %self.order_id))]
    async fn execute(&self, ctx: &CommandContext) -> Result<Self::Result, ServiceError> {
        self.validate().map_err(|e| {
            PO_SPLIT_FAILURES.inc();
            ServiceError::ValidationError(format!("Invalid input: {}", e))
        })?;

        let mut original = ctx
            .orders
            .find_by_id(self.order_id)
            .await?
            .ok_or_else(|| {
                PO_SPLIT_FAILURES.inc();
                ServiceError::NotFound(format!(
                    "Purchase order with ID {} not found",
                    self.order_id
                ))
            })?;

        if self.new_vendor_id == original.vendor_id {
            PO_SPLIT_FAILURES.inc();
            return Err(ServiceError::ValidationError(
                "Split target vendor must differ from the order's vendor".to_string(),
            ));
        }

        let totals = effective_quantities(&self.items).map_err(|e| {
            PO_SPLIT_FAILURES.inc();
            e
        })?;
        if totals.is_empty() {
            PO_SPLIT_FAILURES.inc();
            return Err(ServiceError::ValidationError(
                "No quantities provided".to_string(),
            ));
        }
        validate_against_order(&original, &totals).map_err(|e| {
            PO_SPLIT_FAILURES.inc();
            error!(order_id = %self.order_id, "split rejected: {}", e);
            e
        })?;

        // Build the new order's lines before touching the original, in the
        // original's item order.
        let mut new_items = Vec::with_capacity(totals.len());
        for item in &original.items {
            if let Some(quantity) = totals.get(&item.id) {
                new_items.push(PurchaseOrderItem {
                    id: Uuid::new_v4(),
                    description: item.description.clone(),
                    quantity: *quantity,
                    unit_price: item.unit_price,
                    received_quantity: 0,
                });
            }
        }

        for (item_id, quantity) in &totals {
            if let Some(item) = original.item_mut(*item_id) {
                item.quantity -= quantity;
            }
        }
        // Quantities changed; a fully-received-then-reduced line must read
        // as fulfilled.
        original.status = derive_status(&original);

        let po_number = ctx.orders.next_po_number().await?;
        let now = Utc::now();
        let new_order = PurchaseOrder {
            id: Uuid::new_v4(),
            po_number,
            work_order_id: original.work_order_id,
            vendor_id: self.new_vendor_id,
            status: PurchaseOrderStatus::Draft,
            issue_date: None,
            expected_delivery_date: original.expected_delivery_date,
            notes: self.notes.clone(),
            items: new_items,
            fulfillments: vec![],
            split_from_order_id: Some(original.id),
            revision: 0,
            created_at: now,
            updated_at: now,
        };

        // Save the original first: a concurrent writer surfaces as Conflict
        // here, before the sibling order exists.
        let original = ctx.orders.save(original).await.map_err(|e| {
            PO_SPLIT_FAILURES.inc();
            e
        })?;
        let new_order = ctx.orders.insert(new_order).await?;

        info!(
            original_order_id = %original.id,
            new_order_id = %new_order.id,
            new_vendor_id = %new_order.vendor_id,
            lines = %new_order.items.len(),
            "Purchase order split"
        );

        ctx.event_sender
            .send(Event::PurchaseOrderSplit {
                original_order_id: original.id,
                new_order_id: new_order.id,
            })
            .await
            .map_err(ServiceError::EventError)?;

        PO_SPLITS.inc();

        Ok(new_order)
    }
}
