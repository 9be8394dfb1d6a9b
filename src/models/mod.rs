pub mod purchase_order;
pub mod vendor;

pub use purchase_order::{
    Fulfillment, FulfillmentItem, PurchaseOrder, PurchaseOrderItem, PurchaseOrderStatus,
};
pub use vendor::Vendor;
