// Reminder tiers escalate as an unpaid invoice ages past its due date.
// The schedule carries the day offsets per coach; the classifier in the
// service layer decides which tier currently applies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{AppError, Result};

/// Escalating notification stages tied to days past due.
///
/// Ordering matters: `First < Second < Final < Suspension`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "VARCHAR(20)", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReminderTier {
    First,
    Second,
    Final,
    Suspension,
}

impl ReminderTier {
    /// All tiers in escalation order
    pub const ALL: [ReminderTier; 4] = [
        ReminderTier::First,
        ReminderTier::Second,
        ReminderTier::Final,
        ReminderTier::Suspension,
    ];
}

impl std::fmt::Display for ReminderTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReminderTier::First => write!(f, "first"),
            ReminderTier::Second => write!(f, "second"),
            ReminderTier::Final => write!(f, "final"),
            ReminderTier::Suspension => write!(f, "suspension"),
        }
    }
}

impl std::str::FromStr for ReminderTier {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "first" => Ok(ReminderTier::First),
            "second" => Ok(ReminderTier::Second),
            "final" => Ok(ReminderTier::Final),
            "suspension" => Ok(ReminderTier::Suspension),
            _ => Err(format!("Invalid reminder tier: {}", s)),
        }
    }
}

/// Per-coach reminder schedule: day offsets measured from the due date.
///
/// Offsets are validated strictly increasing at construction, so a schedule
/// where a later tier fires before an earlier one cannot exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderSchedule {
    first_reminder_days: i64,
    second_reminder_days: i64,
    final_reminder_days: i64,
    overdue_suspension_days: i64,
}

impl ReminderSchedule {
    pub fn new(
        first_reminder_days: i64,
        second_reminder_days: i64,
        final_reminder_days: i64,
        overdue_suspension_days: i64,
    ) -> Result<Self> {
        if first_reminder_days < 1 {
            return Err(AppError::validation(
                "First reminder offset must be at least 1 day past due",
            ));
        }

        let increasing = first_reminder_days < second_reminder_days
            && second_reminder_days < final_reminder_days
            && final_reminder_days < overdue_suspension_days;
        if !increasing {
            return Err(AppError::validation(
                "Reminder offsets must be strictly increasing",
            ));
        }

        Ok(Self {
            first_reminder_days,
            second_reminder_days,
            final_reminder_days,
            overdue_suspension_days,
        })
    }

    /// Day offset past due at which a tier becomes applicable
    pub fn threshold(&self, tier: ReminderTier) -> i64 {
        match tier {
            ReminderTier::First => self.first_reminder_days,
            ReminderTier::Second => self.second_reminder_days,
            ReminderTier::Final => self.final_reminder_days,
            ReminderTier::Suspension => self.overdue_suspension_days,
        }
    }
}

impl Default for ReminderSchedule {
    /// 3 / 7 / 14 days past due, suspension after 30
    fn default() -> Self {
        Self {
            first_reminder_days: 3,
            second_reminder_days: 7,
            final_reminder_days: 14,
            overdue_suspension_days: 30,
        }
    }
}

/// Append-only log entry: a reminder tier sent for an invoice.
///
/// At most one row per (invoice, tier); the store enforces it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentReminder {
    pub id: String,
    pub invoice_id: String,
    pub tier: ReminderTier,
    pub sent_at: DateTime<Utc>,
}

impl PaymentReminder {
    pub fn new(invoice_id: String, tier: ReminderTier) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            invoice_id,
            tier,
            sent_at: Utc::now(),
        }
    }
}
