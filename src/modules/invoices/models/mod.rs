pub mod invoice;
pub mod invoice_item;

pub use invoice::{Invoice, InvoiceStatus};
pub use invoice_item::InvoiceItem;
