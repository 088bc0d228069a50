// A payment records one settlement attempt against an invoice. Rows are
// append-only: a succeeded payment is only ever revisited by the
// compensating write that voids it when a concurrent settlement won the
// race before the balance update landed.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{AppError, Currency, Result};

/// Supported payment methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR(20)", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    BankTransfer,
    Sepa,
    ApplePay,
    GooglePay,
    Cash,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Card => write!(f, "card"),
            PaymentMethod::BankTransfer => write!(f, "bank_transfer"),
            PaymentMethod::Sepa => write!(f, "sepa"),
            PaymentMethod::ApplePay => write!(f, "apple_pay"),
            PaymentMethod::GooglePay => write!(f, "google_pay"),
            PaymentMethod::Cash => write!(f, "cash"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "card" => Ok(PaymentMethod::Card),
            "bank_transfer" => Ok(PaymentMethod::BankTransfer),
            "sepa" => Ok(PaymentMethod::Sepa),
            "apple_pay" => Ok(PaymentMethod::ApplePay),
            "google_pay" => Ok(PaymentMethod::GooglePay),
            "cash" => Ok(PaymentMethod::Cash),
            _ => Err(format!("Invalid payment method: {}", s)),
        }
    }
}

/// Outcome of a settlement attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR(20)", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Succeeded,
    Failed,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Succeeded => write!(f, "succeeded"),
            PaymentStatus::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "succeeded" => Ok(PaymentStatus::Succeeded),
            "failed" => Ok(PaymentStatus::Failed),
            _ => Err(format!("Invalid payment status: {}", s)),
        }
    }
}

/// A single settlement attempt against an invoice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Unique payment ID (UUID)
    pub id: String,

    /// Invoice this payment applies to
    pub invoice_id: String,

    /// Applied amount; positive for succeeded payments
    pub amount: Decimal,

    /// Currency, always matching the invoice currency
    pub currency: Currency,

    /// Payment method used
    pub method: PaymentMethod,

    /// Outcome
    pub status: PaymentStatus,

    /// Reason for a failed attempt
    pub failure_reason: Option<String>,

    /// When the attempt was processed
    pub processed_at: DateTime<Utc>,
}

impl Payment {
    /// Create a succeeded payment with validation
    pub fn succeeded(
        invoice_id: String,
        amount: Decimal,
        currency: Currency,
        method: PaymentMethod,
    ) -> Result<Self> {
        if amount <= Decimal::ZERO {
            return Err(AppError::validation(format!(
                "Payment amount must be positive, got: {}",
                amount
            )));
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            invoice_id,
            amount: currency.round(amount),
            currency,
            method,
            status: PaymentStatus::Succeeded,
            failure_reason: None,
            processed_at: Utc::now(),
        })
    }

    /// Create a failed payment, recording the decline reason
    pub fn failed(
        invoice_id: String,
        currency: Currency,
        method: PaymentMethod,
        reason: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            invoice_id,
            amount: Decimal::ZERO,
            currency,
            method,
            status: PaymentStatus::Failed,
            failure_reason: Some(reason),
            processed_at: Utc::now(),
        }
    }

    pub fn is_succeeded(&self) -> bool {
        self.status == PaymentStatus::Succeeded
    }
}
