use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use crate::core::{AppError, Currency, Result};
use crate::modules::invoices::models::{Invoice, InvoiceItem, InvoiceStatus};
use crate::modules::invoices::repositories::InvoiceRepository;

/// Input for a single invoice line item
#[derive(Debug, Clone, Deserialize)]
pub struct NewInvoiceItem {
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Service owning invoice creation, numbering and status transitions
pub struct InvoiceService {
    invoice_repo: Arc<dyn InvoiceRepository>,
}

impl InvoiceService {
    pub fn new(invoice_repo: Arc<dyn InvoiceRepository>) -> Self {
        Self { invoice_repo }
    }

    /// Create a new draft invoice.
    ///
    /// Computes the total from the item list, assigns a fresh per-coach
    /// invoice number and persists with nothing paid. Fails validation when
    /// the item list is empty or the total is not positive.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_invoice(
        &self,
        coach_id: &str,
        client_id: &str,
        items: Vec<NewInvoiceItem>,
        due_date: NaiveDate,
        currency: Currency,
        subscription_id: Option<String>,
        notes: Option<String>,
    ) -> Result<Invoice> {
        if items.is_empty() {
            return Err(AppError::validation(
                "Invoice must have at least one line item",
            ));
        }

        let items = Self::build_items(items, currency)?;

        let invoice_number = self.invoice_repo.next_invoice_number(coach_id).await?;

        let invoice = Invoice::new(
            coach_id.to_string(),
            client_id.to_string(),
            invoice_number,
            currency,
            items,
            due_date,
            subscription_id,
            notes,
        )?;

        let created = self.invoice_repo.create(&invoice).await?;

        info!(
            invoice_id = %created.id,
            invoice_number = %created.invoice_number,
            amount_total = %created.amount_total,
            "Invoice created"
        );

        Ok(created)
    }

    /// Get invoice by ID
    pub async fn get_invoice(&self, invoice_id: &str) -> Result<Invoice> {
        self.invoice_repo
            .find_by_id(invoice_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Invoice '{}' not found", invoice_id)))
    }

    /// List all invoices for a coach
    pub async fn list_invoices(&self, coach_id: &str) -> Result<Vec<Invoice>> {
        self.invoice_repo.list_by_coach(coach_id).await
    }

    /// Deliver a draft invoice: draft -> sent.
    ///
    /// Re-sending an already delivered invoice is a no-op; a paid invoice
    /// cannot be re-sent.
    pub async fn mark_sent(&self, invoice_id: &str) -> Result<Invoice> {
        let invoice = self.get_invoice(invoice_id).await?;

        match invoice.status {
            InvoiceStatus::Draft => {
                self.invoice_repo
                    .update_status(invoice_id, InvoiceStatus::Sent)
                    .await?;
                info!(invoice_id = %invoice_id, "Invoice sent");
                self.get_invoice(invoice_id).await
            }
            InvoiceStatus::Sent | InvoiceStatus::Overdue => Ok(invoice),
            InvoiceStatus::Paid => Err(AppError::validation(
                "Cannot re-send an invoice that is already paid",
            )),
        }
    }

    /// Mark an invoice as paid, stamping paid_at.
    ///
    /// Used for out-of-band reconciliation (e.g. a bank transfer confirmed
    /// manually) and by the settlement engine once the balance reaches the
    /// total. Raises amount_paid to amount_total so the settled-state
    /// invariant holds for manual reconciliation too.
    pub async fn mark_paid(
        &self,
        invoice_id: &str,
        paid_at: Option<DateTime<Utc>>,
    ) -> Result<Invoice> {
        // Existence check first so NotFound wins over any later state error
        let invoice = self.get_invoice(invoice_id).await?;

        if invoice.status == InvoiceStatus::Paid {
            return Ok(invoice);
        }

        let paid_at = paid_at.unwrap_or_else(Utc::now);
        self.invoice_repo.mark_paid(invoice_id, paid_at).await?;

        info!(invoice_id = %invoice_id, "Invoice marked paid");

        self.get_invoice(invoice_id).await
    }

    /// Mark an unpaid invoice overdue.
    ///
    /// No-op on paid invoices; idempotent on invoices already overdue.
    pub async fn mark_overdue(&self, invoice_id: &str) -> Result<Invoice> {
        let invoice = self.get_invoice(invoice_id).await?;

        match invoice.status {
            InvoiceStatus::Paid | InvoiceStatus::Overdue => Ok(invoice),
            InvoiceStatus::Draft | InvoiceStatus::Sent => {
                if !invoice.is_overdue(Utc::now()) {
                    return Err(AppError::validation(format!(
                        "Invoice '{}' is not past its due date",
                        invoice_id
                    )));
                }

                self.invoice_repo
                    .update_status(invoice_id, InvoiceStatus::Overdue)
                    .await?;
                info!(invoice_id = %invoice_id, "Invoice marked overdue");
                self.get_invoice(invoice_id).await
            }
        }
    }

    /// Replace the item list of a draft invoice and recompute its total.
    ///
    /// Only draft invoices with no settled payments can be edited.
    pub async fn replace_items(
        &self,
        invoice_id: &str,
        items: Vec<NewInvoiceItem>,
    ) -> Result<Invoice> {
        let invoice = self.get_invoice(invoice_id).await?;

        if invoice.status != InvoiceStatus::Draft {
            return Err(AppError::validation(
                "Only draft invoices can have their items replaced",
            ));
        }

        if invoice.amount_paid > Decimal::ZERO {
            return Err(AppError::validation(
                "Cannot replace items on an invoice with settled payments",
            ));
        }

        if items.is_empty() {
            return Err(AppError::validation(
                "Invoice must have at least one line item",
            ));
        }

        let items = Self::build_items(items, invoice.currency)?;
        let amount_total = Invoice::sum_items(&items, invoice.currency);

        if amount_total <= Decimal::ZERO {
            return Err(AppError::validation(
                "Invoice total must be greater than zero",
            ));
        }

        self.invoice_repo
            .replace_items(invoice_id, &items, amount_total)
            .await?;

        self.get_invoice(invoice_id).await
    }

    fn build_items(items: Vec<NewInvoiceItem>, currency: Currency) -> Result<Vec<InvoiceItem>> {
        items
            .into_iter()
            .map(|item| {
                InvoiceItem::new(item.description, item.quantity, item.unit_price, currency)
            })
            .collect()
    }
}
