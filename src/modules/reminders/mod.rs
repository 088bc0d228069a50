// Reminders module

pub mod models;
pub mod repositories;
pub mod services;

pub use models::{PaymentReminder, ReminderSchedule, ReminderTier};
pub use repositories::{MemoryReminderRepository, MySqlReminderRepository, ReminderRepository};
pub use services::ReminderService;
