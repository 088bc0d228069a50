pub mod payment_settings;

pub use payment_settings::{CompanyProfile, PaymentSettings};
