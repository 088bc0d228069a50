use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Revenue settled in one calendar month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyRevenue {
    pub year: i32,
    pub month: u32,
    /// Total settled in this month
    pub revenue: Decimal,
    /// Number of succeeded payments that contributed
    pub payment_count: i64,
}

/// Revenue attributed to one client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRevenue {
    pub client_id: String,
    pub revenue: Decimal,
    pub invoice_count: i64,
}

/// Revenue grouped by a caller-supplied categorisation key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRevenue {
    pub category: String,
    pub revenue: Decimal,
    pub invoice_count: i64,
}

/// Outstanding overdue position at a point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverdueSummary {
    /// Sum of remaining balances across overdue invoices
    pub amount: Decimal,
    pub count: i64,
}

/// Financial rollup for a coach over a date range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialStats {
    /// Start of the reporting period (inclusive)
    pub start_date: NaiveDate,
    /// End of the reporting period (inclusive)
    pub end_date: NaiveDate,
    pub monthly_revenue: Vec<MonthlyRevenue>,
    /// Revenue from subscription-linked invoices only
    pub recurring_revenue: Decimal,
    /// Fraction of invoices settled on or before their due date, in [0, 1]
    pub payment_rate: Decimal,
    pub overdue: OverdueSummary,
    pub top_clients: Vec<ClientRevenue>,
}

impl FinancialStats {
    /// Total settled revenue across the period
    pub fn total_revenue(&self) -> Decimal {
        self.monthly_revenue.iter().map(|m| m.revenue).sum()
    }

    /// Whether the period produced no figures at all
    pub fn is_empty(&self) -> bool {
        self.monthly_revenue.is_empty() && self.top_clients.is_empty() && self.overdue.count == 0
    }
}
