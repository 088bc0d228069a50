use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::core::{AppError, Result};
use crate::modules::invoices::models::Invoice;
use crate::modules::invoices::repositories::InvoiceRepository;
use crate::modules::reminders::models::{PaymentReminder, ReminderSchedule, ReminderTier};
use crate::modules::reminders::repositories::ReminderRepository;

/// Reminder-tier policy and the append-only reminder log.
///
/// Classification is pure; the caller owns actually sending the notification
/// and then recording the tier here. There is no clock in this service — the
/// driving scheduler passes `now` in.
pub struct ReminderService {
    reminder_repo: Arc<dyn ReminderRepository>,
    invoice_repo: Arc<dyn InvoiceRepository>,
}

impl ReminderService {
    pub fn new(
        reminder_repo: Arc<dyn ReminderRepository>,
        invoice_repo: Arc<dyn InvoiceRepository>,
    ) -> Self {
        Self {
            reminder_repo,
            invoice_repo,
        }
    }

    /// Which reminder tier, if any, applies to this invoice right now.
    ///
    /// Returns the highest tier whose day offset past the due date has been
    /// crossed and that is not in `sent_tiers`. Paid and not-yet-due
    /// invoices never classify. Day counting is by calendar date, matching
    /// the overdue rule.
    pub fn classify(
        invoice: &Invoice,
        schedule: &ReminderSchedule,
        sent_tiers: &[ReminderTier],
        now: DateTime<Utc>,
    ) -> Option<ReminderTier> {
        if invoice.is_fully_paid() {
            return None;
        }

        let days_past_due = (now.date_naive() - invoice.due_date).num_days();
        if days_past_due < 1 {
            return None;
        }

        ReminderTier::ALL
            .into_iter()
            .rev()
            .find(|tier| days_past_due >= schedule.threshold(*tier) && !sent_tiers.contains(tier))
    }

    /// Classify against the invoice's recorded reminder log
    pub async fn next_reminder(
        &self,
        invoice_id: &str,
        schedule: &ReminderSchedule,
        now: DateTime<Utc>,
    ) -> Result<Option<ReminderTier>> {
        let invoice = self
            .invoice_repo
            .find_by_id(invoice_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Invoice '{}' not found", invoice_id)))?;

        let sent_tiers: Vec<ReminderTier> = self
            .reminder_repo
            .list_by_invoice(invoice_id)
            .await?
            .into_iter()
            .map(|r| r.tier)
            .collect();

        Ok(Self::classify(&invoice, schedule, &sent_tiers, now))
    }

    /// Record that a reminder tier was sent for an invoice.
    ///
    /// The store rejects a duplicate (invoice, tier) with `Conflict`.
    pub async fn record_reminder(
        &self,
        invoice_id: &str,
        tier: ReminderTier,
    ) -> Result<PaymentReminder> {
        self.invoice_repo
            .find_by_id(invoice_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Invoice '{}' not found", invoice_id)))?;

        let reminder = PaymentReminder::new(invoice_id.to_string(), tier);
        let recorded = self.reminder_repo.record(&reminder).await?;

        info!(invoice_id = %invoice_id, tier = %tier, "Reminder recorded");

        Ok(recorded)
    }

    /// Reminder log for an invoice
    pub async fn reminders_for(&self, invoice_id: &str) -> Result<Vec<PaymentReminder>> {
        self.reminder_repo.list_by_invoice(invoice_id).await
    }
}
