use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::core::{AppError, Result};
use crate::modules::invoices::repositories::InvoiceRepository;
use crate::modules::payments::models::{Payment, PaymentMethod};
use crate::modules::payments::repositories::PaymentRepository;
use crate::modules::settings::repositories::SettingsRepository;

/// Payment settlement engine.
///
/// Applies a monetary settlement against exactly one invoice with no
/// double-spend and no overpayment. Serializability per invoice comes from
/// the repository's conditional balance update: a settlement that loses the
/// race voids its own payment row and surfaces `Conflict` for the caller to
/// retry. Settlements on different invoices are fully independent.
pub struct SettlementService {
    payment_repo: Arc<dyn PaymentRepository>,
    invoice_repo: Arc<dyn InvoiceRepository>,
    settings_repo: Arc<dyn SettingsRepository>,
}

impl SettlementService {
    pub fn new(
        payment_repo: Arc<dyn PaymentRepository>,
        invoice_repo: Arc<dyn InvoiceRepository>,
        settings_repo: Arc<dyn SettingsRepository>,
    ) -> Self {
        Self {
            payment_repo,
            invoice_repo,
            settings_repo,
        }
    }

    /// Apply a settlement to an invoice.
    ///
    /// A request above the remaining balance is clamped: the payment settles
    /// exactly the remaining balance, never more. This matches the
    /// pay-up-to-remaining behaviour of the product; the clamp is part of
    /// this contract, not a silent correction.
    ///
    /// # Errors
    /// * `NotFound` - invoice does not exist
    /// * `AlreadySettled` - the balance is already zero
    /// * `Validation` - non-positive amount, or a method the coach disabled
    /// * `Conflict` - a concurrent settlement won; re-read and retry
    pub async fn settle(
        &self,
        invoice_id: &str,
        requested_amount: Decimal,
        method: PaymentMethod,
    ) -> Result<Payment> {
        let invoice = self
            .invoice_repo
            .find_by_id(invoice_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Invoice '{}' not found", invoice_id)))?;

        if invoice.is_fully_paid() {
            return Err(AppError::already_settled(format!(
                "Invoice '{}' has no remaining balance",
                invoice_id
            )));
        }

        if requested_amount <= Decimal::ZERO {
            return Err(AppError::validation(format!(
                "Settlement amount must be positive, got: {}",
                requested_amount
            )));
        }

        if let Some(settings) = self.settings_repo.find_by_coach(&invoice.coach_id).await? {
            if !settings.method_enabled(method) {
                return Err(AppError::validation(format!(
                    "Payment method '{}' is not enabled for this coach",
                    method
                )));
            }
        }

        let remaining = invoice.remaining_balance();
        let applied_amount = invoice.currency.round(requested_amount.min(remaining));

        let payment = Payment::succeeded(
            invoice_id.to_string(),
            applied_amount,
            invoice.currency,
            method,
        )?;
        let payment = self.payment_repo.create(&payment).await?;

        // Conditional update keyed on the balance we read above. Losing the
        // race must not leave the succeeded payment orphaned, so it is
        // voided before surfacing the conflict.
        let applied = self
            .invoice_repo
            .apply_payment(invoice_id, invoice.amount_paid, applied_amount)
            .await?;

        if !applied {
            self.payment_repo
                .mark_failed(&payment.id, "concurrent settlement lost the race")
                .await?;

            warn!(
                invoice_id = %invoice_id,
                payment_id = %payment.id,
                "Settlement lost a concurrent update; payment voided"
            );

            return Err(AppError::conflict(format!(
                "Invoice '{}' was settled concurrently; re-read and retry",
                invoice_id
            )));
        }

        info!(
            invoice_id = %invoice_id,
            payment_id = %payment.id,
            amount = %payment.amount,
            method = %method,
            "Payment settled"
        );

        if invoice.amount_paid + applied_amount >= invoice.amount_total {
            self.invoice_repo
                .mark_paid(invoice_id, payment.processed_at)
                .await?;

            info!(invoice_id = %invoice_id, "Invoice fully settled");
        }

        Ok(payment)
    }

    /// Settle the entire remaining balance of an invoice
    pub async fn settle_full(&self, invoice_id: &str, method: PaymentMethod) -> Result<Payment> {
        let invoice = self
            .invoice_repo
            .find_by_id(invoice_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Invoice '{}' not found", invoice_id)))?;

        if invoice.is_fully_paid() {
            return Err(AppError::already_settled(format!(
                "Invoice '{}' has no remaining balance",
                invoice_id
            )));
        }

        self.settle(invoice_id, invoice.remaining_balance(), method)
            .await
    }

    /// Record a declined settlement attempt.
    ///
    /// Writes a failed payment row for the audit trail; never touches
    /// amount_paid or invoice status.
    pub async fn record_failure(
        &self,
        invoice_id: &str,
        method: PaymentMethod,
        reason: &str,
    ) -> Result<Payment> {
        let invoice = self
            .invoice_repo
            .find_by_id(invoice_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Invoice '{}' not found", invoice_id)))?;

        let payment = Payment::failed(
            invoice_id.to_string(),
            invoice.currency,
            method,
            reason.to_string(),
        );
        let payment = self.payment_repo.create(&payment).await?;

        info!(
            invoice_id = %invoice_id,
            payment_id = %payment.id,
            reason = %reason,
            "Payment failure recorded"
        );

        Ok(payment)
    }

    /// All settlement attempts against an invoice, oldest first
    pub async fn payment_history(&self, invoice_id: &str) -> Result<Vec<Payment>> {
        self.invoice_repo
            .find_by_id(invoice_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Invoice '{}' not found", invoice_id)))?;

        self.payment_repo.list_by_invoice(invoice_id).await
    }
}
