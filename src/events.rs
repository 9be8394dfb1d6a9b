use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

/// Domain events emitted by command execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    PurchaseOrderCreated(Uuid),
    PurchaseOrderUpdated(Uuid),
    PurchaseOrderDeleted(Uuid),
    FulfillmentRecorded {
        order_id: Uuid,
        fulfillment_id: Uuid,
    },
    PurchaseOrderSplit {
        original_order_id: Uuid,
        new_order_id: Uuid,
    },
    VendorCreated(Uuid),
    VendorUpdated(Uuid),
    VendorDeleted(Uuid),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Creates a bounded event channel with the given capacity.
pub fn channel(capacity: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(capacity);
    (EventSender::new(tx), rx)
}

/// Background consumer for the event stream. Runs until every sender is
/// dropped. Downstream integrations (webhooks, audit log) would hang off
/// this loop; today it records the stream to the log.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::PurchaseOrderCreated(id) => info!(order_id = %id, "purchase order created"),
            Event::PurchaseOrderUpdated(id) => info!(order_id = %id, "purchase order updated"),
            Event::PurchaseOrderDeleted(id) => info!(order_id = %id, "purchase order deleted"),
            Event::FulfillmentRecorded {
                order_id,
                fulfillment_id,
            } => info!(order_id = %order_id, fulfillment_id = %fulfillment_id, "fulfillment recorded"),
            Event::PurchaseOrderSplit {
                original_order_id,
                new_order_id,
            } => info!(
                original_order_id = %original_order_id,
                new_order_id = %new_order_id,
                "purchase order split"
            ),
            Event::VendorCreated(id) => info!(vendor_id = %id, "vendor created"),
            Event::VendorUpdated(id) => info!(vendor_id = %id, "vendor updated"),
            Event::VendorDeleted(id) => info!(vendor_id = %id, "vendor deleted"),
        }
        debug!(?event, "event processed");
    }
}
