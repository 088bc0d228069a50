pub mod invoice_repository;
pub mod memory;

pub use invoice_repository::{InvoiceRepository, MySqlInvoiceRepository};
pub use memory::MemoryInvoiceRepository;
