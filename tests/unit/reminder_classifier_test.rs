/// Tests for the reminder tier classifier.
///
/// The classifier is a pure function over the invoice, the coach's
/// schedule, the already-sent tiers and the current time.
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use coachbill::core::Currency;
use coachbill::invoices::{Invoice, InvoiceItem, InvoiceStatus};
use coachbill::reminders::{ReminderSchedule, ReminderService, ReminderTier};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn unpaid_invoice(due_date: NaiveDate) -> Invoice {
    let item = InvoiceItem::new(
        "Coaching session".to_string(),
        1,
        Decimal::from(100),
        Currency::EUR,
    )
    .unwrap();

    let mut invoice = Invoice::new(
        "coach-1".to_string(),
        "client-1".to_string(),
        "INV-000001".to_string(),
        Currency::EUR,
        vec![item],
        due_date,
        None,
        None,
    )
    .unwrap();
    invoice.status = InvoiceStatus::Sent;
    invoice
}

fn due_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
}

fn days_after_due(days: i64) -> DateTime<Utc> {
    Utc.from_utc_datetime(&(due_date() + Duration::days(days)).and_hms_opt(10, 30, 0).unwrap())
}

fn schedule() -> ReminderSchedule {
    ReminderSchedule::new(3, 7, 14, 30).unwrap()
}

#[test]
fn test_no_tier_before_first_threshold() {
    let invoice = unpaid_invoice(due_date());

    for days in 0..3 {
        assert_eq!(
            ReminderService::classify(&invoice, &schedule(), &[], days_after_due(days)),
            None,
            "no reminder expected {} days past due",
            days
        );
    }
}

#[test]
fn test_first_tier_at_exact_threshold() {
    let invoice = unpaid_invoice(due_date());

    assert_eq!(
        ReminderService::classify(&invoice, &schedule(), &[], days_after_due(3)),
        Some(ReminderTier::First)
    );
}

#[test]
fn test_second_tier_once_first_logged() {
    let invoice = unpaid_invoice(due_date());

    assert_eq!(
        ReminderService::classify(
            &invoice,
            &schedule(),
            &[ReminderTier::First],
            days_after_due(7)
        ),
        Some(ReminderTier::Second)
    );
}

#[test]
fn test_none_once_all_tiers_logged() {
    let invoice = unpaid_invoice(due_date());

    assert_eq!(
        ReminderService::classify(
            &invoice,
            &schedule(),
            &ReminderTier::ALL,
            days_after_due(90)
        ),
        None
    );
}

#[test]
fn test_highest_crossed_tier_wins() {
    let invoice = unpaid_invoice(due_date());

    // Deep past due with an empty log: the classifier escalates straight to
    // suspension rather than replaying earlier tiers.
    assert_eq!(
        ReminderService::classify(&invoice, &schedule(), &[], days_after_due(45)),
        Some(ReminderTier::Suspension)
    );
}

#[test]
fn test_paid_invoice_never_classifies() {
    let mut invoice = unpaid_invoice(due_date());
    invoice.amount_paid = invoice.amount_total;
    invoice.status = InvoiceStatus::Paid;

    assert_eq!(
        ReminderService::classify(&invoice, &schedule(), &[], days_after_due(45)),
        None
    );
}

proptest! {
    /// Property: the classifier never returns a tier that was already sent,
    /// and never one whose threshold has not been crossed
    #[test]
    fn prop_classifier_respects_log_and_thresholds(
        days_past_due in 0i64..120i64,
        sent_mask in 0u8..16u8,
    ) {
        let invoice = unpaid_invoice(due_date());
        let schedule = schedule();

        let sent: Vec<ReminderTier> = ReminderTier::ALL
            .iter()
            .enumerate()
            .filter(|(index, _)| sent_mask & (1 << index) != 0)
            .map(|(_, tier)| *tier)
            .collect();

        let result =
            ReminderService::classify(&invoice, &schedule, &sent, days_after_due(days_past_due));

        if let Some(tier) = result {
            prop_assert!(!sent.contains(&tier));
            prop_assert!(days_past_due >= schedule.threshold(tier));
        }
    }
}
