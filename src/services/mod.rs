pub mod order_status;
pub mod purchase_orders;
pub mod vendors;

pub use purchase_orders::PurchaseOrderService;
pub use vendors::VendorService;
