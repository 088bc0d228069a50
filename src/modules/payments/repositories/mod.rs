pub mod memory;
pub mod payment_repository;

pub use memory::MemoryPaymentRepository;
pub use payment_repository::{MySqlPaymentRepository, PaymentRepository};
