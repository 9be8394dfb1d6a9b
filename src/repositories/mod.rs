use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::{PurchaseOrder, Vendor};

pub mod in_memory;

pub use in_memory::InMemoryRepository;

/// Storage abstraction for purchase orders.
///
/// Keeping the fulfillment/split logic behind this trait isolates it from
/// storage concerns: the in-memory map backs tests and the current
/// deployment, while a persistent store can slot in without touching the
/// engines. `save` performs an optimistic-concurrency check on
/// [`PurchaseOrder::revision`] and fails with `Conflict` when the caller's
/// copy is stale.
#[async_trait]
pub trait PurchaseOrderRepository: Send + Sync {
    /// All orders for a work order, or every order when `work_order_id` is
    /// `None`. An empty result is not an error.
    async fn list(&self, work_order_id: Option<Uuid>) -> Result<Vec<PurchaseOrder>, ServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PurchaseOrder>, ServiceError>;

    async fn find_by_vendor(&self, vendor_id: Uuid) -> Result<Vec<PurchaseOrder>, ServiceError>;

    async fn find_by_status(
        &self,
        status: crate::models::PurchaseOrderStatus,
    ) -> Result<Vec<PurchaseOrder>, ServiceError>;

    /// Inserts a new order. The identity must not already exist.
    async fn insert(&self, order: PurchaseOrder) -> Result<PurchaseOrder, ServiceError>;

    /// Replaces an existing order iff the supplied revision matches the
    /// stored one, bumping the revision. `NotFound` if absent, `Conflict`
    /// if stale.
    async fn save(&self, order: PurchaseOrder) -> Result<PurchaseOrder, ServiceError>;

    async fn delete(&self, id: Uuid) -> Result<(), ServiceError>;

    /// Next human-readable order number, unique within the repository.
    async fn next_po_number(&self) -> Result<String, ServiceError>;
}

/// Storage abstraction for vendors.
#[async_trait]
pub trait VendorRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Vendor>, ServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Vendor>, ServiceError>;

    async fn insert(&self, vendor: Vendor) -> Result<Vendor, ServiceError>;

    async fn save(&self, vendor: Vendor) -> Result<Vendor, ServiceError>;

    async fn delete(&self, id: Uuid) -> Result<(), ServiceError>;
}
