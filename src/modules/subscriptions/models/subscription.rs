// A subscription links a client to a coach's pricing plan. Status writes
// are direct; there are no intermediate states. Cancellation is terminal.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Subscription status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR(20)", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Paused,
    Cancelled,
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubscriptionStatus::Active => write!(f, "active"),
            SubscriptionStatus::Paused => write!(f, "paused"),
            SubscriptionStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for SubscriptionStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "active" => Ok(SubscriptionStatus::Active),
            "paused" => Ok(SubscriptionStatus::Paused),
            "cancelled" => Ok(SubscriptionStatus::Cancelled),
            _ => Err(format!("Invalid subscription status: {}", s)),
        }
    }
}

/// A client's subscription to a pricing plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub client_id: String,
    pub coach_id: String,
    pub plan_id: String,
    pub status: SubscriptionStatus,
    /// Next date an invoice is generated; None for one-time plans
    pub next_billing_date: Option<NaiveDate>,
    /// Sessions left on session-based plans; None means unlimited
    pub sessions_remaining: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    pub fn new(
        client_id: String,
        coach_id: String,
        plan_id: String,
        next_billing_date: Option<NaiveDate>,
        sessions_remaining: Option<i32>,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4().to_string(),
            client_id,
            coach_id,
            plan_id,
            status: SubscriptionStatus::Active,
            next_billing_date,
            sessions_remaining,
            created_at: now,
            updated_at: now,
        }
    }
}
