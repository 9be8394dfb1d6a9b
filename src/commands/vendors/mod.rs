pub mod create_vendor_command;
pub mod delete_vendor_command;
pub mod update_vendor_command;

pub use create_vendor_command::CreateVendorCommand;
pub use delete_vendor_command::DeleteVendorCommand;
pub use update_vendor_command::UpdateVendorCommand;
