use async_trait::async_trait;
use sqlx::{MySqlPool, Row};
use std::str::FromStr;

use crate::core::{AppError, Result};
use crate::modules::reminders::models::{PaymentReminder, ReminderTier};

/// Ledger-store boundary for the reminder log
#[async_trait]
pub trait ReminderRepository: Send + Sync {
    /// Append a reminder entry.
    ///
    /// A duplicate (invoice, tier) pair is rejected with `Conflict`, so the
    /// same tier can never be logged twice even when the driving scheduler
    /// fires more than once in a window.
    async fn record(&self, reminder: &PaymentReminder) -> Result<PaymentReminder>;

    /// List reminders sent for an invoice, in escalation order
    async fn list_by_invoice(&self, invoice_id: &str) -> Result<Vec<PaymentReminder>>;
}

/// MySQL-backed reminder repository.
///
/// Relies on a unique key over (invoice_id, tier).
pub struct MySqlReminderRepository {
    pool: MySqlPool,
}

impl MySqlReminderRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReminderRepository for MySqlReminderRepository {
    async fn record(&self, reminder: &PaymentReminder) -> Result<PaymentReminder> {
        sqlx::query(
            r#"
            INSERT INTO payment_reminders (id, invoice_id, tier, sent_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&reminder.id)
        .bind(&reminder.invoice_id)
        .bind(reminder.tier.to_string())
        .bind(reminder.sent_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::conflict(format!(
                        "Reminder tier '{}' already recorded for invoice '{}'",
                        reminder.tier, reminder.invoice_id
                    ));
                }
            }
            AppError::Database(e)
        })?;

        Ok(reminder.clone())
    }

    async fn list_by_invoice(&self, invoice_id: &str) -> Result<Vec<PaymentReminder>> {
        let rows = sqlx::query(
            r#"
            SELECT id, invoice_id, tier, sent_at
            FROM payment_reminders
            WHERE invoice_id = ?
            ORDER BY sent_at
            "#,
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let tier: String = row.try_get("tier")?;
                Ok(PaymentReminder {
                    id: row.try_get("id")?,
                    invoice_id: row.try_get("invoice_id")?,
                    tier: ReminderTier::from_str(&tier).map_err(|e| {
                        AppError::internal(format!("Invalid tier in database: {}", e))
                    })?,
                    sent_at: row.try_get("sent_at")?,
                })
            })
            .collect()
    }
}
