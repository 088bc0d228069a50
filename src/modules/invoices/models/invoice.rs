// An invoice represents a billable document owed by a client to a coach,
// composed of line items summing to an immutable total. The invoice tracks
// how much of that total has been settled and its lifecycle status.
//
// Status lifecycle: draft -> sent -> paid, with overdue as a side state for
// unpaid invoices past their due date.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::invoice_item::InvoiceItem;
use crate::core::{AppError, Currency, Result};

/// Invoice status lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR(20)", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// Invoice created but not yet delivered to the client
    Draft,

    /// Invoice delivered, awaiting payment
    Sent,

    /// Fully settled
    Paid,

    /// Past due date without full settlement
    Overdue,
}

impl Default for InvoiceStatus {
    fn default() -> Self {
        InvoiceStatus::Draft
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvoiceStatus::Draft => write!(f, "draft"),
            InvoiceStatus::Sent => write!(f, "sent"),
            InvoiceStatus::Paid => write!(f, "paid"),
            InvoiceStatus::Overdue => write!(f, "overdue"),
        }
    }
}

impl std::str::FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "draft" => Ok(InvoiceStatus::Draft),
            "sent" => Ok(InvoiceStatus::Sent),
            "paid" => Ok(InvoiceStatus::Paid),
            "overdue" => Ok(InvoiceStatus::Overdue),
            _ => Err(format!("Invalid invoice status: {}", s)),
        }
    }
}

/// Represents an invoice owed by a client to a coach
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique invoice ID (UUID)
    pub id: String,

    /// Coach the invoice belongs to
    pub coach_id: String,

    /// Client being billed
    pub client_id: String,

    /// Subscription this invoice was generated from, if any
    pub subscription_id: Option<String>,

    /// Human-facing invoice number, unique per coach, assigned once
    pub invoice_number: String,

    /// Currency for the entire invoice
    pub currency: Currency,

    /// Sum of item totals, fixed at creation (item replacement recomputes it)
    pub amount_total: Decimal,

    /// Running total of settled payments, never exceeds amount_total
    pub amount_paid: Decimal,

    /// Current status
    pub status: InvoiceStatus,

    /// Calendar date the invoice falls due
    pub due_date: NaiveDate,

    /// When the invoice was fully settled
    pub paid_at: Option<DateTime<Utc>>,

    /// Free-text notes shown on the invoice
    pub notes: Option<String>,

    /// Line items (stored separately, joined on load)
    pub items: Vec<InvoiceItem>,

    /// When the invoice was created
    pub created_at: DateTime<Utc>,

    /// When the invoice was last updated
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Create a new draft invoice with validation
    ///
    /// # Arguments
    /// * `coach_id` - Owning coach
    /// * `client_id` - Billed client
    /// * `invoice_number` - Pre-assigned per-coach number
    /// * `currency` - Invoice currency
    /// * `items` - Line items (must not be empty, total must be positive)
    /// * `due_date` - Calendar date the invoice falls due
    /// * `subscription_id` - Optional subscription reference
    /// * `notes` - Optional free-text notes
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        coach_id: String,
        client_id: String,
        invoice_number: String,
        currency: Currency,
        items: Vec<InvoiceItem>,
        due_date: NaiveDate,
        subscription_id: Option<String>,
        notes: Option<String>,
    ) -> Result<Self> {
        if items.is_empty() {
            return Err(AppError::validation(
                "Invoice must have at least one line item",
            ));
        }

        let amount_total = Self::sum_items(&items, currency);

        // A zero-value invoice can never be settled; progress math elsewhere
        // assumes a positive denominator.
        if amount_total <= Decimal::ZERO {
            return Err(AppError::validation(
                "Invoice total must be greater than zero",
            ));
        }

        let now = Utc::now();

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            coach_id,
            client_id,
            subscription_id,
            invoice_number,
            currency,
            amount_total,
            amount_paid: Decimal::ZERO,
            status: InvoiceStatus::Draft,
            due_date,
            paid_at: None,
            notes,
            items,
            created_at: now,
            updated_at: now,
        })
    }

    /// Sum item totals, rounded per currency scale
    pub fn sum_items(items: &[InvoiceItem], currency: Currency) -> Decimal {
        currency.round(items.iter().map(|item| item.total).sum())
    }

    /// Outstanding balance: amount_total - amount_paid
    pub fn remaining_balance(&self) -> Decimal {
        self.amount_total - self.amount_paid
    }

    /// Whether the settled amount covers the total
    pub fn is_fully_paid(&self) -> bool {
        self.amount_paid >= self.amount_total
    }

    /// Pure overdue predicate.
    ///
    /// Comparison is by calendar date, not timestamp difference: an invoice
    /// is not overdue on its due date, only from the next calendar day.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        now.date_naive() > self.due_date && self.status != InvoiceStatus::Paid
    }
}
