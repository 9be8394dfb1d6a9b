pub mod create_purchase_order_command;
pub mod delete_purchase_order_command;
pub mod record_fulfillment_command;
pub mod split_purchase_order_command;
pub mod update_purchase_order_command;

pub use create_purchase_order_command::{CreatePurchaseOrderCommand, PurchaseOrderItemInput};
pub use delete_purchase_order_command::DeletePurchaseOrderCommand;
pub use record_fulfillment_command::{FulfillmentItemInput, RecordFulfillmentCommand};
pub use split_purchase_order_command::{SplitItemInput, SplitPurchaseOrderCommand};
pub use update_purchase_order_command::UpdatePurchaseOrderCommand;
