pub mod reminder;

pub use reminder::{PaymentReminder, ReminderSchedule, ReminderTier};
