// Invoice persistence: trait boundary to the ledger store plus the MySQL
// implementation.
//
// The settlement path relies on `apply_payment`, a conditional update keyed
// on the previously observed amount_paid. Concurrent settlements against the
// same invoice serialize through it: the loser observes no matching row and
// must re-read.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{MySqlPool, Row};
use std::str::FromStr;
use uuid::Uuid;

use crate::core::{AppError, Currency, Result};
use crate::modules::invoices::models::{Invoice, InvoiceItem, InvoiceStatus};

/// Ledger-store boundary for invoices
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    /// Persist a new invoice with its items
    async fn create(&self, invoice: &Invoice) -> Result<Invoice>;

    /// Find invoice by ID, including items
    async fn find_by_id(&self, id: &str) -> Result<Option<Invoice>>;

    /// List all invoices belonging to a coach, newest first
    async fn list_by_coach(&self, coach_id: &str) -> Result<Vec<Invoice>>;

    /// Set the invoice status
    async fn update_status(&self, id: &str, status: InvoiceStatus) -> Result<()>;

    /// Settle the invoice: status paid, paid_at stamped, amount_paid raised
    /// to amount_total
    async fn mark_paid(&self, id: &str, paid_at: DateTime<Utc>) -> Result<()>;

    /// Replace the item list and recompute the stored total
    async fn replace_items(
        &self,
        id: &str,
        items: &[InvoiceItem],
        amount_total: Decimal,
    ) -> Result<()>;

    /// Atomically increment amount_paid by `delta`, conditioned on the
    /// previously observed value.
    ///
    /// Returns Ok(false) when another writer got there first; the caller
    /// must re-read the invoice before retrying.
    async fn apply_payment(&self, id: &str, expected_paid: Decimal, delta: Decimal)
        -> Result<bool>;

    /// Generate the next invoice number for a coach.
    ///
    /// Numbers are monotonically increasing per coach and never reused,
    /// even when the invoice they were assigned to is later voided.
    async fn next_invoice_number(&self, coach_id: &str) -> Result<String>;
}

/// MySQL-backed invoice repository
pub struct MySqlInvoiceRepository {
    pool: MySqlPool,
}

impl MySqlInvoiceRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn fetch_items(&self, invoice_id: &str) -> Result<Vec<InvoiceItem>> {
        let rows = sqlx::query(
            r#"
            SELECT description, quantity, unit_price, total
            FROM invoice_items
            WHERE invoice_id = ?
            ORDER BY position
            "#,
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(InvoiceItem {
                    description: row.try_get("description")?,
                    quantity: row.try_get("quantity")?,
                    unit_price: row.try_get("unit_price")?,
                    total: row.try_get("total")?,
                })
            })
            .collect()
    }

    fn row_to_invoice(row: &sqlx::mysql::MySqlRow, items: Vec<InvoiceItem>) -> Result<Invoice> {
        let currency: String = row.try_get("currency")?;
        let status: String = row.try_get("status")?;

        Ok(Invoice {
            id: row.try_get("id")?,
            coach_id: row.try_get("coach_id")?,
            client_id: row.try_get("client_id")?,
            subscription_id: row.try_get("subscription_id")?,
            invoice_number: row.try_get("invoice_number")?,
            currency: Currency::from_str(&currency)
                .map_err(|e| AppError::internal(format!("Invalid currency in database: {}", e)))?,
            amount_total: row.try_get("amount_total")?,
            amount_paid: row.try_get("amount_paid")?,
            status: InvoiceStatus::from_str(&status)
                .map_err(|e| AppError::internal(format!("Invalid status in database: {}", e)))?,
            due_date: row.try_get("due_date")?,
            paid_at: row.try_get("paid_at")?,
            notes: row.try_get("notes")?,
            items,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

const INVOICE_COLUMNS: &str = "id, coach_id, client_id, subscription_id, invoice_number, \
     currency, amount_total, amount_paid, status, due_date, paid_at, notes, \
     created_at, updated_at";

#[async_trait]
impl InvoiceRepository for MySqlInvoiceRepository {
    async fn create(&self, invoice: &Invoice) -> Result<Invoice> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO invoices (
                id, coach_id, client_id, subscription_id, invoice_number,
                currency, amount_total, amount_paid, status, due_date,
                paid_at, notes, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&invoice.id)
        .bind(&invoice.coach_id)
        .bind(&invoice.client_id)
        .bind(&invoice.subscription_id)
        .bind(&invoice.invoice_number)
        .bind(invoice.currency.to_string())
        .bind(invoice.amount_total)
        .bind(invoice.amount_paid)
        .bind(invoice.status.to_string())
        .bind(invoice.due_date)
        .bind(invoice.paid_at)
        .bind(&invoice.notes)
        .bind(invoice.created_at)
        .bind(invoice.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::conflict(format!(
                        "Invoice number '{}' already exists for coach",
                        invoice.invoice_number
                    ));
                }
            }
            AppError::Database(e)
        })?;

        for (position, item) in invoice.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO invoice_items (
                    id, invoice_id, position, description, quantity, unit_price, total
                ) VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&invoice.id)
            .bind(position as i32)
            .bind(&item.description)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.total)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(invoice.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Invoice>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM invoices WHERE id = ?",
            INVOICE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = self.fetch_items(id).await?;
        Ok(Some(Self::row_to_invoice(&row, items)?))
    }

    async fn list_by_coach(&self, coach_id: &str) -> Result<Vec<Invoice>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM invoices WHERE coach_id = ? ORDER BY created_at DESC",
            INVOICE_COLUMNS
        ))
        .bind(coach_id)
        .fetch_all(&self.pool)
        .await?;

        let mut invoices = Vec::with_capacity(rows.len());
        for row in &rows {
            let id: String = row.try_get("id")?;
            let items = self.fetch_items(&id).await?;
            invoices.push(Self::row_to_invoice(row, items)?);
        }

        Ok(invoices)
    }

    async fn update_status(&self, id: &str, status: InvoiceStatus) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE invoices
            SET status = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(status.to_string())
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Invoice with id '{}' not found",
                id
            )));
        }

        Ok(())
    }

    async fn mark_paid(&self, id: &str, paid_at: DateTime<Utc>) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE invoices
            SET status = 'paid', paid_at = ?, amount_paid = amount_total, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(paid_at)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Invoice with id '{}' not found",
                id
            )));
        }

        Ok(())
    }

    async fn replace_items(
        &self,
        id: &str,
        items: &[InvoiceItem],
        amount_total: Decimal,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM invoice_items WHERE invoice_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        for (position, item) in items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO invoice_items (
                    id, invoice_id, position, description, quantity, unit_price, total
                ) VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(id)
            .bind(position as i32)
            .bind(&item.description)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.total)
            .execute(&mut *tx)
            .await?;
        }

        let result = sqlx::query(
            r#"
            UPDATE invoices
            SET amount_total = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(amount_total)
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Invoice with id '{}' not found",
                id
            )));
        }

        tx.commit().await?;

        Ok(())
    }

    async fn apply_payment(
        &self,
        id: &str,
        expected_paid: Decimal,
        delta: Decimal,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE invoices
            SET amount_paid = amount_paid + ?, updated_at = ?
            WHERE id = ? AND amount_paid = ?
            "#,
        )
        .bind(delta)
        .bind(Utc::now())
        .bind(id)
        .bind(expected_paid)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn next_invoice_number(&self, coach_id: &str) -> Result<String> {
        // Counter row per coach; LAST_INSERT_ID(expr) makes the assigned
        // sequence readable from the statement result itself, so no second
        // round trip and no cross-connection race.
        let result = sqlx::query(
            r#"
            INSERT INTO invoice_counters (coach_id, seq)
            VALUES (?, LAST_INSERT_ID(1))
            ON DUPLICATE KEY UPDATE seq = LAST_INSERT_ID(seq + 1)
            "#,
        )
        .bind(coach_id)
        .execute(&self.pool)
        .await?;

        Ok(format!("INV-{:06}", result.last_insert_id()))
    }
}
