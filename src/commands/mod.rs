use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::ServiceError;
use crate::events::EventSender;
use crate::repositories::{PurchaseOrderRepository, VendorRepository};

pub mod purchaseorders;
pub mod vendors;

/// Shared dependencies handed to every command execution.
#[derive(Clone)]
pub struct CommandContext {
    pub orders: Arc<dyn PurchaseOrderRepository>,
    pub vendors: Arc<dyn VendorRepository>,
    pub event_sender: Arc<EventSender>,
}

/// A single validated mutation against the repository.
///
/// Commands validate their full input before touching any state, so a
/// failure leaves the repository exactly as it was (all-or-nothing).
#[async_trait]
pub trait Command: Send + Sync {
    type Result: Send;

    async fn execute(&self, ctx: &CommandContext) -> Result<Self::Result, ServiceError>;
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::events;
    use crate::repositories::InMemoryRepository;

    /// Fresh in-memory context with a drained event channel. Must be called
    /// from within a tokio runtime.
    pub(crate) fn test_context() -> CommandContext {
        let repo = Arc::new(InMemoryRepository::new());
        let (event_sender, mut rx) = events::channel(64);
        tokio::spawn(async move { while rx.recv().await.is_some() {} });
        CommandContext {
            orders: repo.clone(),
            vendors: repo,
            event_sender: Arc::new(event_sender),
        }
    }
}
