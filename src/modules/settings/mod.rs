// Settings module

pub mod models;
pub mod repositories;
pub mod services;

pub use models::{CompanyProfile, PaymentSettings};
pub use repositories::{MemorySettingsRepository, MySqlSettingsRepository, SettingsRepository};
pub use services::SettingsService;
