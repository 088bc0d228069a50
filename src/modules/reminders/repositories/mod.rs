pub mod memory;
pub mod reminder_repository;

pub use memory::MemoryReminderRepository;
pub use reminder_repository::{MySqlReminderRepository, ReminderRepository};
