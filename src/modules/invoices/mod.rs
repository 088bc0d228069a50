// Invoices module

pub mod models;
pub mod repositories;
pub mod services;

pub use models::{Invoice, InvoiceItem, InvoiceStatus};
pub use repositories::{InvoiceRepository, MemoryInvoiceRepository, MySqlInvoiceRepository};
pub use services::{InvoiceService, NewInvoiceItem};
