pub mod reminder_service;

pub use reminder_service::ReminderService;
