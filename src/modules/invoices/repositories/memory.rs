// In-memory invoice repository for tests and the simulated deployment mode.
// Mirrors the conditional-update semantics of the MySQL implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::core::{AppError, Result};
use crate::modules::invoices::models::{Invoice, InvoiceItem, InvoiceStatus};

use super::invoice_repository::InvoiceRepository;

#[derive(Default)]
struct State {
    invoices: HashMap<String, Invoice>,
    counters: HashMap<String, u64>,
}

/// In-memory invoice repository
#[derive(Default)]
pub struct MemoryInvoiceRepository {
    state: Mutex<State>,
}

impl MemoryInvoiceRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InvoiceRepository for MemoryInvoiceRepository {
    async fn create(&self, invoice: &Invoice) -> Result<Invoice> {
        let mut state = self.state.lock().await;

        let duplicate_number = state.invoices.values().any(|existing| {
            existing.coach_id == invoice.coach_id
                && existing.invoice_number == invoice.invoice_number
        });
        if duplicate_number {
            return Err(AppError::conflict(format!(
                "Invoice number '{}' already exists for coach",
                invoice.invoice_number
            )));
        }

        state.invoices.insert(invoice.id.clone(), invoice.clone());
        Ok(invoice.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Invoice>> {
        let state = self.state.lock().await;
        Ok(state.invoices.get(id).cloned())
    }

    async fn list_by_coach(&self, coach_id: &str) -> Result<Vec<Invoice>> {
        let state = self.state.lock().await;
        let mut invoices: Vec<Invoice> = state
            .invoices
            .values()
            .filter(|invoice| invoice.coach_id == coach_id)
            .cloned()
            .collect();
        invoices.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(invoices)
    }

    async fn update_status(&self, id: &str, status: InvoiceStatus) -> Result<()> {
        let mut state = self.state.lock().await;
        let invoice = state
            .invoices
            .get_mut(id)
            .ok_or_else(|| AppError::not_found(format!("Invoice with id '{}' not found", id)))?;

        invoice.status = status;
        invoice.updated_at = Utc::now();
        Ok(())
    }

    async fn mark_paid(&self, id: &str, paid_at: DateTime<Utc>) -> Result<()> {
        let mut state = self.state.lock().await;
        let invoice = state
            .invoices
            .get_mut(id)
            .ok_or_else(|| AppError::not_found(format!("Invoice with id '{}' not found", id)))?;

        invoice.status = InvoiceStatus::Paid;
        invoice.paid_at = Some(paid_at);
        invoice.amount_paid = invoice.amount_total;
        invoice.updated_at = Utc::now();
        Ok(())
    }

    async fn replace_items(
        &self,
        id: &str,
        items: &[InvoiceItem],
        amount_total: Decimal,
    ) -> Result<()> {
        let mut state = self.state.lock().await;
        let invoice = state
            .invoices
            .get_mut(id)
            .ok_or_else(|| AppError::not_found(format!("Invoice with id '{}' not found", id)))?;

        invoice.items = items.to_vec();
        invoice.amount_total = amount_total;
        invoice.updated_at = Utc::now();
        Ok(())
    }

    async fn apply_payment(
        &self,
        id: &str,
        expected_paid: Decimal,
        delta: Decimal,
    ) -> Result<bool> {
        let mut state = self.state.lock().await;
        let Some(invoice) = state.invoices.get_mut(id) else {
            return Ok(false);
        };

        // Same compare-and-swap contract as the SQL conditional update
        if invoice.amount_paid != expected_paid {
            return Ok(false);
        }

        invoice.amount_paid += delta;
        invoice.updated_at = Utc::now();
        Ok(true)
    }

    async fn next_invoice_number(&self, coach_id: &str) -> Result<String> {
        let mut state = self.state.lock().await;
        let seq = state.counters.entry(coach_id.to_string()).or_insert(0);
        *seq += 1;
        Ok(format!("INV-{:06}", seq))
    }
}
