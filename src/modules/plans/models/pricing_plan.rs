// A pricing plan is a coach's sellable offer. Plans are soft-deleted by
// clearing is_active so historical invoices and subscriptions keep a valid
// reference.

use chrono::{DateTime, Duration, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{AppError, Currency, Result};

/// How often a plan bills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR(20)", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BillingInterval {
    OneTime,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl BillingInterval {
    /// Next billing date after `from`; None for one-time plans
    pub fn advance(&self, from: NaiveDate) -> Option<NaiveDate> {
        match self {
            BillingInterval::OneTime => None,
            BillingInterval::Weekly => Some(from + Duration::weeks(1)),
            BillingInterval::Monthly => from.checked_add_months(Months::new(1)),
            BillingInterval::Quarterly => from.checked_add_months(Months::new(3)),
            BillingInterval::Yearly => from.checked_add_months(Months::new(12)),
        }
    }
}

impl std::fmt::Display for BillingInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BillingInterval::OneTime => write!(f, "one_time"),
            BillingInterval::Weekly => write!(f, "weekly"),
            BillingInterval::Monthly => write!(f, "monthly"),
            BillingInterval::Quarterly => write!(f, "quarterly"),
            BillingInterval::Yearly => write!(f, "yearly"),
        }
    }
}

impl std::str::FromStr for BillingInterval {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "one_time" => Ok(BillingInterval::OneTime),
            "weekly" => Ok(BillingInterval::Weekly),
            "monthly" => Ok(BillingInterval::Monthly),
            "quarterly" => Ok(BillingInterval::Quarterly),
            "yearly" => Ok(BillingInterval::Yearly),
            _ => Err(format!("Invalid billing interval: {}", s)),
        }
    }
}

/// A coach's sellable pricing plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingPlan {
    pub id: String,
    pub coach_id: String,
    pub name: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub interval: BillingInterval,
    /// Number of sessions included, when the plan is session-based
    pub session_count: Option<i32>,
    pub features: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PricingPlan {
    /// Create a new active plan with validation
    pub fn new(
        coach_id: String,
        name: String,
        amount: Decimal,
        currency: Currency,
        interval: BillingInterval,
        session_count: Option<i32>,
        features: Vec<String>,
    ) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(AppError::validation("Plan name cannot be empty"));
        }

        if amount <= Decimal::ZERO {
            return Err(AppError::validation(format!(
                "Plan amount must be positive, got: {}",
                amount
            )));
        }

        if let Some(count) = session_count {
            if count < 1 {
                return Err(AppError::validation(format!(
                    "Session count must be at least 1, got: {}",
                    count
                )));
            }
        }

        let now = Utc::now();

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            coach_id,
            name,
            amount: currency.round(amount),
            currency,
            interval,
            session_count,
            features,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }
}
