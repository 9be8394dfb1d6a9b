pub mod common;
pub mod purchase_orders;
pub mod vendors;

use std::sync::Arc;

use crate::events::EventSender;
use crate::repositories::InMemoryRepository;
use crate::services::{PurchaseOrderService, VendorService};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub purchase_orders: Arc<PurchaseOrderService>,
    pub vendors: Arc<VendorService>,
}

impl AppServices {
    /// Build the service container on top of a shared repository.
    pub fn new(repository: Arc<InMemoryRepository>, event_sender: Arc<EventSender>) -> Self {
        let purchase_orders = Arc::new(PurchaseOrderService::new(
            repository.clone(),
            repository.clone(),
            event_sender.clone(),
        ));
        let vendors = Arc::new(VendorService::new(
            repository.clone(),
            repository,
            event_sender,
        ));
        Self {
            purchase_orders,
            vendors,
        }
    }
}
