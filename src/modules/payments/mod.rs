// Payments module

pub mod models;
pub mod repositories;
pub mod services;

pub use models::{Payment, PaymentMethod, PaymentStatus};
pub use repositories::{MemoryPaymentRepository, MySqlPaymentRepository, PaymentRepository};
pub use services::SettlementService;
