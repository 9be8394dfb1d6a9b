use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::{PurchaseOrder, PurchaseOrderStatus, Vendor};
use crate::repositories::{PurchaseOrderRepository, VendorRepository};

/// In-memory store for purchase orders and vendors, keyed by identity.
///
/// Every mutation runs under a single write lock, so validate-then-write
/// sequences applied by the commands are atomic with respect to each other.
/// The per-order revision check in `save` additionally rejects lost updates
/// when two callers race on the same order.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    orders: RwLock<HashMap<Uuid, PurchaseOrder>>,
    vendors: RwLock<HashMap<Uuid, Vendor>>,
    po_sequence: AtomicU64,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error() -> ServiceError {
    ServiceError::InternalError("repository lock poisoned".to_string())
}

#[async_trait]
impl PurchaseOrderRepository for InMemoryRepository {
    async fn list(&self, work_order_id: Option<Uuid>) -> Result<Vec<PurchaseOrder>, ServiceError> {
        let orders = self.orders.read().map_err(|_| lock_error())?;
        let mut result: Vec<PurchaseOrder> = orders
            .values()
            .filter(|order| work_order_id.map_or(true, |wo| order.work_order_id == wo))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PurchaseOrder>, ServiceError> {
        let orders = self.orders.read().map_err(|_| lock_error())?;
        Ok(orders.get(&id).cloned())
    }

    async fn find_by_vendor(&self, vendor_id: Uuid) -> Result<Vec<PurchaseOrder>, ServiceError> {
        let orders = self.orders.read().map_err(|_| lock_error())?;
        let mut result: Vec<PurchaseOrder> = orders
            .values()
            .filter(|order| order.vendor_id == vendor_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn find_by_status(
        &self,
        status: PurchaseOrderStatus,
    ) -> Result<Vec<PurchaseOrder>, ServiceError> {
        let orders = self.orders.read().map_err(|_| lock_error())?;
        let mut result: Vec<PurchaseOrder> = orders
            .values()
            .filter(|order| order.status == status)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn insert(&self, order: PurchaseOrder) -> Result<PurchaseOrder, ServiceError> {
        let mut orders = self.orders.write().map_err(|_| lock_error())?;
        if orders.contains_key(&order.id) {
            return Err(ServiceError::Conflict(format!(
                "Purchase order {} already exists",
                order.id
            )));
        }
        orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn save(&self, mut order: PurchaseOrder) -> Result<PurchaseOrder, ServiceError> {
        let mut orders = self.orders.write().map_err(|_| lock_error())?;
        let stored = orders
            .get(&order.id)
            .ok_or_else(|| ServiceError::NotFound(format!(
                "Purchase order with ID {} not found",
                order.id
            )))?;

        if stored.revision != order.revision {
            return Err(ServiceError::ConcurrentModification(order.id));
        }

        order.revision += 1;
        order.updated_at = Utc::now();
        orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let mut orders = self.orders.write().map_err(|_| lock_error())?;
        orders.remove(&id).ok_or_else(|| {
            ServiceError::NotFound(format!("Purchase order with ID {} not found", id))
        })?;
        Ok(())
    }

    async fn next_po_number(&self) -> Result<String, ServiceError> {
        let seq = self.po_sequence.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("PO-{:05}", seq))
    }
}

#[async_trait]
impl VendorRepository for InMemoryRepository {
    async fn list(&self) -> Result<Vec<Vendor>, ServiceError> {
        let vendors = self.vendors.read().map_err(|_| lock_error())?;
        let mut result: Vec<Vendor> = vendors.values().cloned().collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Vendor>, ServiceError> {
        let vendors = self.vendors.read().map_err(|_| lock_error())?;
        Ok(vendors.get(&id).cloned())
    }

    async fn insert(&self, vendor: Vendor) -> Result<Vendor, ServiceError> {
        let mut vendors = self.vendors.write().map_err(|_| lock_error())?;
        if vendors.contains_key(&vendor.id) {
            return Err(ServiceError::Conflict(format!(
                "Vendor {} already exists",
                vendor.id
            )));
        }
        vendors.insert(vendor.id, vendor.clone());
        Ok(vendor)
    }

    async fn save(&self, mut vendor: Vendor) -> Result<Vendor, ServiceError> {
        let mut vendors = self.vendors.write().map_err(|_| lock_error())?;
        if !vendors.contains_key(&vendor.id) {
            return Err(ServiceError::NotFound(format!(
                "Vendor with ID {} not found",
                vendor.id
            )));
        }
        vendor.updated_at = Utc::now();
        vendors.insert(vendor.id, vendor.clone());
        Ok(vendor)
    }

    async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let mut vendors = self.vendors.write().map_err(|_| lock_error())?;
        vendors
            .remove(&id)
            .ok_or_else(|| ServiceError::NotFound(format!("Vendor with ID {} not found", id)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn order() -> PurchaseOrder {
        PurchaseOrder {
            id: Uuid::new_v4(),
            po_number: "PO-00001".to_string(),
            work_order_id: Uuid::new_v4(),
            vendor_id: Uuid::new_v4(),
            status: PurchaseOrderStatus::Draft,
            issue_date: None,
            expected_delivery_date: None,
            notes: None,
            items: vec![],
            fulfillments: vec![],
            split_from_order_id: None,
            revision: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn insert_then_find_round_trips() {
        let repo = InMemoryRepository::new();
        let order = order();
        let id = order.id;

        PurchaseOrderRepository::insert(&repo, order).await.unwrap();
        let found = PurchaseOrderRepository::find_by_id(&repo, id).await.unwrap();
        assert_eq!(found.map(|o| o.id), Some(id));
    }

    #[tokio::test]
    async fn list_filters_by_work_order() {
        let repo = InMemoryRepository::new();
        let a = order();
        let wo = a.work_order_id;
        let b = order();
        PurchaseOrderRepository::insert(&repo, a).await.unwrap();
        PurchaseOrderRepository::insert(&repo, b).await.unwrap();

        assert_eq!(
            PurchaseOrderRepository::list(&repo, Some(wo)).await.unwrap().len(),
            1
        );
        assert_eq!(
            PurchaseOrderRepository::list(&repo, None).await.unwrap().len(),
            2
        );
        assert!(PurchaseOrderRepository::list(&repo, Some(Uuid::new_v4()))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn save_bumps_revision_and_rejects_stale_writers() {
        let repo = InMemoryRepository::new();
        let order = PurchaseOrderRepository::insert(&repo, order()).await.unwrap();

        let first = PurchaseOrderRepository::save(&repo, order.clone())
            .await
            .unwrap();
        assert_eq!(first.revision, order.revision + 1);

        // A second writer holding the original copy is now stale.
        let stale = PurchaseOrderRepository::save(&repo, order).await;
        assert_matches!(stale, Err(ServiceError::ConcurrentModification(_)));
    }

    #[tokio::test]
    async fn delete_missing_order_is_not_found() {
        let repo = InMemoryRepository::new();
        let result = PurchaseOrderRepository::delete(&repo, Uuid::new_v4()).await;
        assert_matches!(result, Err(ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn po_numbers_are_unique_and_monotonic() {
        let repo = InMemoryRepository::new();
        let first = repo.next_po_number().await.unwrap();
        let second = repo.next_po_number().await.unwrap();
        assert_eq!(first, "PO-00001");
        assert_eq!(second, "PO-00002");
    }
}
