// Integration tests for the financial aggregator, folding over a seeded
// ledger of invoices and settlements.

use std::sync::Arc;

use chrono::{Duration, Utc};
use coachbill::core::Currency;
use coachbill::invoices::{InvoiceService, MemoryInvoiceRepository, NewInvoiceItem};
use coachbill::payments::{MemoryPaymentRepository, PaymentMethod, SettlementService};
use coachbill::reports::ReportService;
use coachbill::settings::MemorySettingsRepository;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

struct Fixture {
    invoices: InvoiceService,
    settlements: SettlementService,
    reports: ReportService,
}

fn fixture() -> Fixture {
    let invoice_repo = Arc::new(MemoryInvoiceRepository::new());
    let payment_repo = Arc::new(MemoryPaymentRepository::new());
    let settings_repo = Arc::new(MemorySettingsRepository::new());

    Fixture {
        invoices: InvoiceService::new(invoice_repo.clone()),
        settlements: SettlementService::new(
            payment_repo.clone(),
            invoice_repo.clone(),
            settings_repo,
        ),
        reports: ReportService::new(invoice_repo, payment_repo),
    }
}

async fn seeded_invoice(
    fixture: &Fixture,
    coach_id: &str,
    client_id: &str,
    amount: i64,
    due_in_days: i64,
    subscription_id: Option<&str>,
    notes: Option<&str>,
) -> String {
    let invoice = fixture
        .invoices
        .create_invoice(
            coach_id,
            client_id,
            vec![NewInvoiceItem {
                description: "Coaching service".to_string(),
                quantity: 1,
                unit_price: Decimal::from(amount),
            }],
            (Utc::now() + Duration::days(due_in_days)).date_naive(),
            Currency::EUR,
            subscription_id.map(str::to_string),
            notes.map(str::to_string),
        )
        .await
        .unwrap();
    fixture.invoices.mark_sent(&invoice.id).await.unwrap();
    invoice.id
}

/// Seed: two clients, four invoices, mixed punctuality.
///
/// client-1: 100 settled on time + 199 subscription-linked on time
/// client-2: 80 settled late + 100 settled partially (40), now overdue
async fn seed(fixture: &Fixture) {
    let a = seeded_invoice(fixture, "coach-1", "client-1", 100, 5, None, Some("personal-training")).await;
    let b = seeded_invoice(fixture, "coach-1", "client-2", 80, -10, None, Some("nutrition")).await;
    let d = seeded_invoice(fixture, "coach-1", "client-2", 100, -10, None, Some("personal-training")).await;
    let e = seeded_invoice(fixture, "coach-1", "client-1", 199, 5, Some("sub-1"), Some("subscription")).await;

    fixture.settlements.settle_full(&a, PaymentMethod::Card).await.unwrap();
    fixture.settlements.settle_full(&b, PaymentMethod::Sepa).await.unwrap();
    fixture.settlements.settle(&d, dec!(40), PaymentMethod::Card).await.unwrap();
    fixture.settlements.settle_full(&e, PaymentMethod::Card).await.unwrap();
}

fn range() -> (chrono::NaiveDate, chrono::NaiveDate) {
    let today = Utc::now().date_naive();
    (today - Duration::days(60), today + Duration::days(60))
}

#[tokio::test]
async fn test_monthly_revenue_totals() {
    let fixture = fixture();
    seed(&fixture).await;
    let (start, end) = range();

    let monthly = fixture
        .reports
        .monthly_revenue("coach-1", start, end)
        .await
        .unwrap();

    let revenue: Decimal = monthly.iter().map(|m| m.revenue).sum();
    let payments: i64 = monthly.iter().map(|m| m.payment_count).sum();

    // 100 + 80 + 40 + 199
    assert_eq!(revenue, dec!(419));
    assert_eq!(payments, 4);
}

#[tokio::test]
async fn test_recurring_revenue_counts_subscription_invoices_only() {
    let fixture = fixture();
    seed(&fixture).await;
    let (start, end) = range();

    let recurring = fixture
        .reports
        .recurring_revenue("coach-1", start, end)
        .await
        .unwrap();

    assert_eq!(recurring, dec!(199));
}

#[tokio::test]
async fn test_payment_rate() {
    let fixture = fixture();
    seed(&fixture).await;
    let (start, end) = range();

    // Four delivered invoices with due dates in range; two settled on time
    let rate = fixture
        .reports
        .payment_rate("coach-1", start, end)
        .await
        .unwrap();

    assert_eq!(rate, dec!(0.5));
}

#[tokio::test]
async fn test_overdue_summary() {
    let fixture = fixture();
    seed(&fixture).await;

    let summary = fixture
        .reports
        .overdue_summary("coach-1", Utc::now())
        .await
        .unwrap();

    // Only the partially settled invoice is still outstanding past due
    assert_eq!(summary.count, 1);
    assert_eq!(summary.amount, dec!(60));
}

#[tokio::test]
async fn test_top_clients_ranking() {
    let fixture = fixture();
    seed(&fixture).await;
    let (start, end) = range();

    let top = fixture
        .reports
        .top_clients("coach-1", start, end, 10)
        .await
        .unwrap();

    assert_eq!(top.len(), 2);
    assert_eq!(top[0].client_id, "client-1");
    assert_eq!(top[0].revenue, dec!(299));
    assert_eq!(top[1].client_id, "client-2");
    assert_eq!(top[1].revenue, dec!(120));
}

#[tokio::test]
async fn test_top_clients_ties_break_by_client_id() {
    let fixture = fixture();
    let (start, end) = range();

    // Two clients with identical settled revenue
    let first = seeded_invoice(&fixture, "coach-2", "client-b", 50, 5, None, None).await;
    let second = seeded_invoice(&fixture, "coach-2", "client-a", 50, 5, None, None).await;
    fixture.settlements.settle_full(&first, PaymentMethod::Card).await.unwrap();
    fixture.settlements.settle_full(&second, PaymentMethod::Card).await.unwrap();

    let top = fixture
        .reports
        .top_clients("coach-2", start, end, 10)
        .await
        .unwrap();

    assert_eq!(top[0].client_id, "client-a");
    assert_eq!(top[1].client_id, "client-b");
}

#[tokio::test]
async fn test_service_breakdown_by_notes() {
    let fixture = fixture();
    seed(&fixture).await;
    let (start, end) = range();

    let breakdown = fixture
        .reports
        .service_breakdown("coach-1", start, end, |invoice| {
            invoice.notes.clone().unwrap_or_else(|| "general".to_string())
        })
        .await
        .unwrap();

    assert_eq!(breakdown.len(), 3);
    assert_eq!(breakdown[0].category, "subscription");
    assert_eq!(breakdown[0].revenue, dec!(199));
    assert_eq!(breakdown[1].category, "personal-training");
    assert_eq!(breakdown[1].revenue, dec!(140));
    assert_eq!(breakdown[2].category, "nutrition");
    assert_eq!(breakdown[2].revenue, dec!(80));
}

#[tokio::test]
async fn test_empty_ledger_yields_zeroes_not_errors() {
    let fixture = fixture();
    let (start, end) = range();

    let top = fixture
        .reports
        .top_clients("coach-without-invoices", start, end, 10)
        .await
        .unwrap();
    assert!(top.is_empty());

    let monthly = fixture
        .reports
        .monthly_revenue("coach-without-invoices", start, end)
        .await
        .unwrap();
    assert!(monthly.is_empty());

    let rate = fixture
        .reports
        .payment_rate("coach-without-invoices", start, end)
        .await
        .unwrap();
    assert_eq!(rate, Decimal::ZERO);

    let stats = fixture
        .reports
        .financial_stats("coach-without-invoices", start, end, Utc::now())
        .await
        .unwrap();
    assert!(stats.is_empty());
}

#[tokio::test]
async fn test_financial_stats_bundle() {
    let fixture = fixture();
    seed(&fixture).await;
    let (start, end) = range();

    let stats = fixture
        .reports
        .financial_stats("coach-1", start, end, Utc::now())
        .await
        .unwrap();

    assert_eq!(stats.total_revenue(), dec!(419));
    assert_eq!(stats.recurring_revenue, dec!(199));
    assert_eq!(stats.payment_rate, dec!(0.5));
    assert_eq!(stats.overdue.count, 1);
    assert_eq!(stats.top_clients.len(), 2);

    // Per-client buckets reconcile with the period total
    let by_client: Decimal = stats.top_clients.iter().map(|c| c.revenue).sum();
    assert_eq!(by_client, stats.total_revenue());
}
