use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::core::{AppError, Result};
use crate::modules::invoices::models::{Invoice, InvoiceStatus};
use crate::modules::invoices::repositories::InvoiceRepository;
use crate::modules::payments::models::Payment;
use crate::modules::payments::repositories::PaymentRepository;
use crate::modules::reports::models::{
    CategoryRevenue, ClientRevenue, FinancialStats, MonthlyRevenue, OverdueSummary,
};

/// Read-only financial rollups for a coach.
///
/// Every figure is a fold over the coach's invoices and their settled
/// payments; nothing here writes to the ledger. An empty invoice set always
/// yields zero/empty output.
pub struct ReportService {
    invoice_repo: Arc<dyn InvoiceRepository>,
    payment_repo: Arc<dyn PaymentRepository>,
}

impl ReportService {
    pub fn new(
        invoice_repo: Arc<dyn InvoiceRepository>,
        payment_repo: Arc<dyn PaymentRepository>,
    ) -> Self {
        Self {
            invoice_repo,
            payment_repo,
        }
    }

    /// Settled revenue per calendar month, ascending
    pub async fn monthly_revenue(
        &self,
        coach_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<MonthlyRevenue>> {
        Self::validate_date_range(start_date, end_date)?;

        let ledger = self.invoices_with_payments(coach_id).await?;

        let mut buckets: BTreeMap<(i32, u32), (Decimal, i64)> = BTreeMap::new();
        for (_, payments) in &ledger {
            for payment in Self::settled_in_range(payments, start_date, end_date) {
                let date = payment.processed_at.date_naive();
                let bucket = buckets.entry((date.year(), date.month())).or_default();
                bucket.0 += payment.amount;
                bucket.1 += 1;
            }
        }

        Ok(buckets
            .into_iter()
            .map(|((year, month), (revenue, payment_count))| MonthlyRevenue {
                year,
                month,
                revenue,
                payment_count,
            })
            .collect())
    }

    /// Revenue from subscription-linked invoices only
    pub async fn recurring_revenue(
        &self,
        coach_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Decimal> {
        Self::validate_date_range(start_date, end_date)?;

        let ledger = self.invoices_with_payments(coach_id).await?;

        Ok(ledger
            .iter()
            .filter(|(invoice, _)| invoice.subscription_id.is_some())
            .flat_map(|(_, payments)| Self::settled_in_range(payments, start_date, end_date))
            .map(|payment| payment.amount)
            .sum())
    }

    /// Fraction of invoices settled on or before their due date, in [0, 1].
    ///
    /// Considers non-draft invoices whose due date falls inside the range;
    /// zero when there are none.
    pub async fn payment_rate(
        &self,
        coach_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Decimal> {
        Self::validate_date_range(start_date, end_date)?;

        let invoices = self.invoice_repo.list_by_coach(coach_id).await?;

        let considered: Vec<&Invoice> = invoices
            .iter()
            .filter(|invoice| {
                invoice.status != InvoiceStatus::Draft
                    && invoice.due_date >= start_date
                    && invoice.due_date <= end_date
            })
            .collect();

        if considered.is_empty() {
            return Ok(Decimal::ZERO);
        }

        let on_time = considered
            .iter()
            .filter(|invoice| {
                invoice.status == InvoiceStatus::Paid
                    && invoice
                        .paid_at
                        .map(|paid_at| paid_at.date_naive() <= invoice.due_date)
                        .unwrap_or(false)
            })
            .count();

        let rate = Decimal::from(on_time as u64) / Decimal::from(considered.len() as u64);
        Ok(rate.round_dp(4))
    }

    /// Outstanding overdue balance and invoice count as of `now`
    pub async fn overdue_summary(&self, coach_id: &str, now: DateTime<Utc>) -> Result<OverdueSummary> {
        let invoices = self.invoice_repo.list_by_coach(coach_id).await?;

        let mut summary = OverdueSummary::default();
        for invoice in invoices.iter().filter(|invoice| invoice.is_overdue(now)) {
            summary.amount += invoice.remaining_balance();
            summary.count += 1;
        }

        Ok(summary)
    }

    /// Clients ranked by settled revenue, ties broken by client id.
    ///
    /// Returns an empty list for a coach with no invoices.
    pub async fn top_clients(
        &self,
        coach_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        limit: usize,
    ) -> Result<Vec<ClientRevenue>> {
        Self::validate_date_range(start_date, end_date)?;

        let ledger = self.invoices_with_payments(coach_id).await?;

        // BTreeMap keeps client ids ordered, which settles revenue ties
        // deterministically after the sort below.
        let mut buckets: BTreeMap<String, (Decimal, i64)> = BTreeMap::new();
        for (invoice, payments) in &ledger {
            let settled: Vec<&Payment> = Self::settled_in_range(payments, start_date, end_date);
            if settled.is_empty() {
                continue;
            }

            let bucket = buckets.entry(invoice.client_id.clone()).or_default();
            bucket.0 += settled.iter().map(|payment| payment.amount).sum::<Decimal>();
            bucket.1 += 1;
        }

        let mut ranked: Vec<ClientRevenue> = buckets
            .into_iter()
            .map(|(client_id, (revenue, invoice_count))| ClientRevenue {
                client_id,
                revenue,
                invoice_count,
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.revenue
                .cmp(&a.revenue)
                .then_with(|| a.client_id.cmp(&b.client_id))
        });
        ranked.truncate(limit);

        Ok(ranked)
    }

    /// Settled revenue grouped by a caller-supplied categorisation key
    pub async fn service_breakdown<F>(
        &self,
        coach_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        categorize: F,
    ) -> Result<Vec<CategoryRevenue>>
    where
        F: Fn(&Invoice) -> String,
    {
        Self::validate_date_range(start_date, end_date)?;

        let ledger = self.invoices_with_payments(coach_id).await?;

        let mut buckets: BTreeMap<String, (Decimal, i64)> = BTreeMap::new();
        for (invoice, payments) in &ledger {
            let settled: Vec<&Payment> = Self::settled_in_range(payments, start_date, end_date);
            if settled.is_empty() {
                continue;
            }

            let bucket = buckets.entry(categorize(invoice)).or_default();
            bucket.0 += settled.iter().map(|payment| payment.amount).sum::<Decimal>();
            bucket.1 += 1;
        }

        let mut breakdown: Vec<CategoryRevenue> = buckets
            .into_iter()
            .map(|(category, (revenue, invoice_count))| CategoryRevenue {
                category,
                revenue,
                invoice_count,
            })
            .collect();

        breakdown.sort_by(|a, b| {
            b.revenue
                .cmp(&a.revenue)
                .then_with(|| a.category.cmp(&b.category))
        });

        Ok(breakdown)
    }

    /// Bundle the standard figures into one report
    pub async fn financial_stats(
        &self,
        coach_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<FinancialStats> {
        Self::validate_date_range(start_date, end_date)?;

        info!(
            coach_id = %coach_id,
            start = %start_date,
            end = %end_date,
            "Generating financial stats"
        );

        let stats = FinancialStats {
            start_date,
            end_date,
            monthly_revenue: self.monthly_revenue(coach_id, start_date, end_date).await?,
            recurring_revenue: self
                .recurring_revenue(coach_id, start_date, end_date)
                .await?,
            payment_rate: self.payment_rate(coach_id, start_date, end_date).await?,
            overdue: self.overdue_summary(coach_id, now).await?,
            top_clients: self.top_clients(coach_id, start_date, end_date, 10).await?,
        };

        if stats.is_empty() {
            warn!(
                coach_id = %coach_id,
                "Empty financial stats for period {} to {}",
                start_date,
                end_date
            );
        }

        Ok(stats)
    }

    async fn invoices_with_payments(
        &self,
        coach_id: &str,
    ) -> Result<Vec<(Invoice, Vec<Payment>)>> {
        let invoices = self.invoice_repo.list_by_coach(coach_id).await?;

        let mut ledger = Vec::with_capacity(invoices.len());
        for invoice in invoices {
            let payments = self.payment_repo.list_by_invoice(&invoice.id).await?;
            ledger.push((invoice, payments));
        }

        Ok(ledger)
    }

    fn settled_in_range(
        payments: &[Payment],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Vec<&Payment> {
        payments
            .iter()
            .filter(|payment| {
                let date = payment.processed_at.date_naive();
                payment.is_succeeded() && date >= start_date && date <= end_date
            })
            .collect()
    }

    fn validate_date_range(start_date: NaiveDate, end_date: NaiveDate) -> Result<()> {
        if start_date > end_date {
            return Err(AppError::validation(format!(
                "start_date ({}) must be before or equal to end_date ({})",
                start_date, end_date
            )));
        }

        Ok(())
    }
}
