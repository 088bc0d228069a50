pub mod invoice_service;

pub use invoice_service::{InvoiceService, NewInvoiceItem};
