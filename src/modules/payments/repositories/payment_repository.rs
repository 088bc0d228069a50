use async_trait::async_trait;
use sqlx::{MySqlPool, Row};
use std::str::FromStr;

use crate::core::{AppError, Currency, Result};
use crate::modules::payments::models::{Payment, PaymentMethod, PaymentStatus};

/// Ledger-store boundary for payments
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Persist a new payment row
    async fn create(&self, payment: &Payment) -> Result<Payment>;

    /// Find payment by ID
    async fn find_by_id(&self, id: &str) -> Result<Option<Payment>>;

    /// List payments for an invoice, oldest first
    async fn list_by_invoice(&self, invoice_id: &str) -> Result<Vec<Payment>>;

    /// Compensating write: flip a payment to failed with a reason.
    ///
    /// Used when the balance update a succeeded payment belongs to could not
    /// be applied, so the ledger never shows an orphaned settlement.
    async fn mark_failed(&self, id: &str, reason: &str) -> Result<()>;
}

/// MySQL-backed payment repository
pub struct MySqlPaymentRepository {
    pool: MySqlPool,
}

impl MySqlPaymentRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_payment(row: &sqlx::mysql::MySqlRow) -> Result<Payment> {
        let currency: String = row.try_get("currency")?;
        let method: String = row.try_get("method")?;
        let status: String = row.try_get("status")?;

        Ok(Payment {
            id: row.try_get("id")?,
            invoice_id: row.try_get("invoice_id")?,
            amount: row.try_get("amount")?,
            currency: Currency::from_str(&currency)
                .map_err(|e| AppError::internal(format!("Invalid currency in database: {}", e)))?,
            method: PaymentMethod::from_str(&method)
                .map_err(|e| AppError::internal(format!("Invalid method in database: {}", e)))?,
            status: PaymentStatus::from_str(&status)
                .map_err(|e| AppError::internal(format!("Invalid status in database: {}", e)))?,
            failure_reason: row.try_get("failure_reason")?,
            processed_at: row.try_get("processed_at")?,
        })
    }
}

#[async_trait]
impl PaymentRepository for MySqlPaymentRepository {
    async fn create(&self, payment: &Payment) -> Result<Payment> {
        sqlx::query(
            r#"
            INSERT INTO payments (
                id, invoice_id, amount, currency, method, status,
                failure_reason, processed_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.invoice_id)
        .bind(payment.amount)
        .bind(payment.currency.to_string())
        .bind(payment.method.to_string())
        .bind(payment.status.to_string())
        .bind(&payment.failure_reason)
        .bind(payment.processed_at)
        .execute(&self.pool)
        .await?;

        Ok(payment.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Payment>> {
        let row = sqlx::query(
            r#"
            SELECT id, invoice_id, amount, currency, method, status,
                   failure_reason, processed_at
            FROM payments
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| Self::row_to_payment(&row)).transpose()
    }

    async fn list_by_invoice(&self, invoice_id: &str) -> Result<Vec<Payment>> {
        let rows = sqlx::query(
            r#"
            SELECT id, invoice_id, amount, currency, method, status,
                   failure_reason, processed_at
            FROM payments
            WHERE invoice_id = ?
            ORDER BY processed_at
            "#,
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_payment).collect()
    }

    async fn mark_failed(&self, id: &str, reason: &str) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE payments
            SET status = 'failed', failure_reason = ?
            WHERE id = ?
            "#,
        )
        .bind(reason)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Payment with id '{}' not found",
                id
            )));
        }

        Ok(())
    }
}
