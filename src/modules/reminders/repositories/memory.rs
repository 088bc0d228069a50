// In-memory reminder repository for tests and the simulated deployment mode.

use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::Mutex;

use crate::core::{AppError, Result};
use crate::modules::reminders::models::{PaymentReminder, ReminderTier};

use super::reminder_repository::ReminderRepository;

/// In-memory reminder repository
#[derive(Default)]
pub struct MemoryReminderRepository {
    reminders: Mutex<Vec<PaymentReminder>>,
}

impl MemoryReminderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReminderRepository for MemoryReminderRepository {
    async fn record(&self, reminder: &PaymentReminder) -> Result<PaymentReminder> {
        let mut reminders = self.reminders.lock().await;

        let seen: HashSet<(&str, ReminderTier)> = reminders
            .iter()
            .map(|r| (r.invoice_id.as_str(), r.tier))
            .collect();
        if seen.contains(&(reminder.invoice_id.as_str(), reminder.tier)) {
            return Err(AppError::conflict(format!(
                "Reminder tier '{}' already recorded for invoice '{}'",
                reminder.tier, reminder.invoice_id
            )));
        }

        reminders.push(reminder.clone());
        Ok(reminder.clone())
    }

    async fn list_by_invoice(&self, invoice_id: &str) -> Result<Vec<PaymentReminder>> {
        let reminders = self.reminders.lock().await;
        let mut matching: Vec<PaymentReminder> = reminders
            .iter()
            .filter(|r| r.invoice_id == invoice_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.sent_at.cmp(&b.sent_at));
        Ok(matching)
    }
}
