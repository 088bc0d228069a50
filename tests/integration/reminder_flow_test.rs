// Integration tests for the reminder flow: classify against the recorded
// log, record tiers, and verify the store-enforced idempotency.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use coachbill::core::{AppError, Currency};
use coachbill::invoices::{InvoiceService, MemoryInvoiceRepository, NewInvoiceItem};
use coachbill::reminders::{
    MemoryReminderRepository, ReminderSchedule, ReminderService, ReminderTier,
};
use rust_decimal::Decimal;

struct Fixture {
    invoices: InvoiceService,
    reminders: ReminderService,
}

fn fixture() -> Fixture {
    let invoice_repo = Arc::new(MemoryInvoiceRepository::new());
    let reminder_repo = Arc::new(MemoryReminderRepository::new());

    Fixture {
        invoices: InvoiceService::new(invoice_repo.clone()),
        reminders: ReminderService::new(reminder_repo, invoice_repo),
    }
}

/// Invoice due on 2025-06-01, observed `days` later at mid-morning
fn observed(days: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap() + Duration::days(days)
}

async fn overdue_invoice(fixture: &Fixture) -> String {
    let invoice = fixture
        .invoices
        .create_invoice(
            "coach-1",
            "client-1",
            vec![NewInvoiceItem {
                description: "Coaching session".to_string(),
                quantity: 1,
                unit_price: Decimal::from(100),
            }],
            observed(0).date_naive(),
            Currency::EUR,
            None,
            None,
        )
        .await
        .unwrap();
    fixture.invoices.mark_sent(&invoice.id).await.unwrap();
    invoice.id
}

#[tokio::test]
async fn test_escalation_walks_all_four_tiers() {
    let fixture = fixture();
    let invoice_id = overdue_invoice(&fixture).await;
    let schedule = ReminderSchedule::new(3, 7, 14, 30).unwrap();

    let steps = [
        (3, ReminderTier::First),
        (7, ReminderTier::Second),
        (14, ReminderTier::Final),
        (30, ReminderTier::Suspension),
    ];

    for (days, expected) in steps {
        let tier = fixture
            .reminders
            .next_reminder(&invoice_id, &schedule, observed(days))
            .await
            .unwrap();
        assert_eq!(tier, Some(expected), "{} days past due", days);

        fixture
            .reminders
            .record_reminder(&invoice_id, expected)
            .await
            .unwrap();

        // Recorded tier no longer classifies at the same instant
        let after = fixture
            .reminders
            .next_reminder(&invoice_id, &schedule, observed(days))
            .await
            .unwrap();
        assert_ne!(after, Some(expected));
    }

    // Everything fired; nothing left to send
    let exhausted = fixture
        .reminders
        .next_reminder(&invoice_id, &schedule, observed(120))
        .await
        .unwrap();
    assert_eq!(exhausted, None);

    let log = fixture.reminders.reminders_for(&invoice_id).await.unwrap();
    assert_eq!(log.len(), 4);
}

#[tokio::test]
async fn test_duplicate_tier_is_rejected_by_the_store() {
    let fixture = fixture();
    let invoice_id = overdue_invoice(&fixture).await;

    fixture
        .reminders
        .record_reminder(&invoice_id, ReminderTier::First)
        .await
        .unwrap();

    let duplicate = fixture
        .reminders
        .record_reminder(&invoice_id, ReminderTier::First)
        .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    // Exactly one row survives
    let log = fixture.reminders.reminders_for(&invoice_id).await.unwrap();
    assert_eq!(log.len(), 1);
}

#[tokio::test]
async fn test_paid_invoice_stops_classifying() {
    let fixture = fixture();
    let invoice_id = overdue_invoice(&fixture).await;
    let schedule = ReminderSchedule::default();

    fixture.invoices.mark_paid(&invoice_id, None).await.unwrap();

    let tier = fixture
        .reminders
        .next_reminder(&invoice_id, &schedule, observed(60))
        .await
        .unwrap();
    assert_eq!(tier, None);
}

#[tokio::test]
async fn test_record_for_unknown_invoice_is_not_found() {
    let fixture = fixture();

    let result = fixture
        .reminders
        .record_reminder("missing", ReminderTier::First)
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}
