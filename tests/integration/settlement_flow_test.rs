// Integration tests for the payment settlement flow, end to end against
// the in-memory ledger:
// create invoice -> settle (full, partial, clamped) -> verify invariants.

use std::sync::Arc;

use chrono::{Duration, Utc};
use coachbill::core::{AppError, Currency};
use coachbill::invoices::{
    InvoiceService, InvoiceStatus, MemoryInvoiceRepository, NewInvoiceItem,
};
use coachbill::payments::{
    MemoryPaymentRepository, PaymentMethod, PaymentStatus, SettlementService,
};
use coachbill::reminders::ReminderSchedule;
use coachbill::settings::{CompanyProfile, MemorySettingsRepository, SettingsService};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

struct Fixture {
    invoices: InvoiceService,
    settlements: SettlementService,
    settings: SettingsService,
}

fn fixture() -> Fixture {
    let invoice_repo = Arc::new(MemoryInvoiceRepository::new());
    let payment_repo = Arc::new(MemoryPaymentRepository::new());
    let settings_repo = Arc::new(MemorySettingsRepository::new());

    Fixture {
        invoices: InvoiceService::new(invoice_repo.clone()),
        settlements: SettlementService::new(payment_repo, invoice_repo, settings_repo.clone()),
        settings: SettingsService::new(settings_repo),
    }
}

async fn invoice_of(fixture: &Fixture, amount: i64) -> String {
    fixture
        .invoices
        .create_invoice(
            "coach-1",
            "client-1",
            vec![NewInvoiceItem {
                description: "Coaching session".to_string(),
                quantity: 1,
                unit_price: Decimal::from(amount),
            }],
            (Utc::now() + Duration::days(14)).date_naive(),
            Currency::EUR,
            None,
            None,
        )
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_full_settlement_marks_invoice_paid() {
    let fixture = fixture();
    let invoice_id = invoice_of(&fixture, 100).await;

    let payment = fixture
        .settlements
        .settle(&invoice_id, dec!(100), PaymentMethod::Card)
        .await
        .unwrap();

    assert_eq!(payment.amount, dec!(100));
    assert_eq!(payment.status, PaymentStatus::Succeeded);

    let invoice = fixture.invoices.get_invoice(&invoice_id).await.unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Paid);
    assert_eq!(invoice.amount_paid, invoice.amount_total);
    assert!(invoice.paid_at.is_some());
}

#[tokio::test]
async fn test_partial_settlements_accumulate() {
    let fixture = fixture();
    let invoice_id = invoice_of(&fixture, 100).await;

    fixture
        .settlements
        .settle(&invoice_id, dec!(40), PaymentMethod::Sepa)
        .await
        .unwrap();

    let invoice = fixture.invoices.get_invoice(&invoice_id).await.unwrap();
    assert_eq!(invoice.amount_paid, dec!(40));
    assert_ne!(invoice.status, InvoiceStatus::Paid);
    assert_eq!(invoice.remaining_balance(), dec!(60));

    fixture
        .settlements
        .settle(&invoice_id, dec!(60), PaymentMethod::Sepa)
        .await
        .unwrap();

    let invoice = fixture.invoices.get_invoice(&invoice_id).await.unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Paid);
    assert_eq!(invoice.amount_paid, dec!(100));
}

#[tokio::test]
async fn test_overpayment_request_is_clamped() {
    let fixture = fixture();
    let invoice_id = invoice_of(&fixture, 100).await;

    // Requesting 150 against a 100 invoice settles exactly 100
    let payment = fixture
        .settlements
        .settle(&invoice_id, dec!(150), PaymentMethod::Card)
        .await
        .unwrap();

    assert_eq!(payment.amount, dec!(100));

    let invoice = fixture.invoices.get_invoice(&invoice_id).await.unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Paid);
    assert_eq!(invoice.amount_paid, dec!(100));

    let history = fixture.settlements.payment_history(&invoice_id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].amount, dec!(100));
}

#[tokio::test]
async fn test_second_full_settlement_is_rejected() {
    let fixture = fixture();
    let invoice_id = invoice_of(&fixture, 100).await;

    fixture
        .settlements
        .settle_full(&invoice_id, PaymentMethod::Card)
        .await
        .unwrap();

    let result = fixture
        .settlements
        .settle_full(&invoice_id, PaymentMethod::Card)
        .await;
    assert!(matches!(result, Err(AppError::AlreadySettled(_))));

    // No second succeeded payment row was created
    let history = fixture.settlements.payment_history(&invoice_id).await.unwrap();
    let succeeded: Vec<_> = history.iter().filter(|p| p.is_succeeded()).collect();
    assert_eq!(succeeded.len(), 1);
}

#[tokio::test]
async fn test_non_positive_amount_is_rejected() {
    let fixture = fixture();
    let invoice_id = invoice_of(&fixture, 100).await;

    for amount in [dec!(0), dec!(-25)] {
        let result = fixture
            .settlements
            .settle(&invoice_id, amount, PaymentMethod::Card)
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    let history = fixture.settlements.payment_history(&invoice_id).await.unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
async fn test_settle_unknown_invoice_is_not_found() {
    let fixture = fixture();

    let result = fixture
        .settlements
        .settle("missing-invoice", dec!(50), PaymentMethod::Card)
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_record_failure_leaves_balance_untouched() {
    let fixture = fixture();
    let invoice_id = invoice_of(&fixture, 100).await;

    let payment = fixture
        .settlements
        .record_failure(&invoice_id, PaymentMethod::Card, "card declined")
        .await
        .unwrap();

    assert_eq!(payment.status, PaymentStatus::Failed);
    assert_eq!(payment.failure_reason.as_deref(), Some("card declined"));

    let invoice = fixture.invoices.get_invoice(&invoice_id).await.unwrap();
    assert_eq!(invoice.amount_paid, Decimal::ZERO);
    assert_eq!(invoice.status, InvoiceStatus::Draft);
}

#[tokio::test]
async fn test_disabled_method_is_rejected() {
    let fixture = fixture();
    let invoice_id = invoice_of(&fixture, 100).await;

    fixture
        .settings
        .upsert_settings(
            "coach-1",
            serde_json::json!({"provider": "stripe"}),
            vec![PaymentMethod::Card, PaymentMethod::Sepa],
            ReminderSchedule::default(),
            CompanyProfile::default(),
            false,
        )
        .await
        .unwrap();

    let result = fixture
        .settlements
        .settle(&invoice_id, dec!(50), PaymentMethod::Cash)
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    // Nothing was written
    let history = fixture.settlements.payment_history(&invoice_id).await.unwrap();
    assert!(history.is_empty());

    // An enabled method still settles
    fixture
        .settlements
        .settle(&invoice_id, dec!(50), PaymentMethod::Sepa)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_pay_bounds_invariant_across_sequences() {
    let fixture = fixture();
    let invoice_id = invoice_of(&fixture, 250).await;

    for amount in [dec!(90), dec!(90), dec!(90), dec!(90)] {
        let result = fixture
            .settlements
            .settle(&invoice_id, amount, PaymentMethod::BankTransfer)
            .await;

        let invoice = fixture.invoices.get_invoice(&invoice_id).await.unwrap();
        assert!(invoice.amount_paid >= Decimal::ZERO);
        assert!(invoice.amount_paid <= invoice.amount_total);

        // Paid status appears exactly when the balance reaches the total
        assert_eq!(
            invoice.status == InvoiceStatus::Paid,
            invoice.amount_paid == invoice.amount_total
        );

        if invoice.is_fully_paid() {
            // Any further attempt must be rejected
            if result.is_err() {
                assert!(matches!(result, Err(AppError::AlreadySettled(_))));
            }
        }
    }

    let invoice = fixture.invoices.get_invoice(&invoice_id).await.unwrap();
    assert_eq!(invoice.amount_paid, dec!(250));
}
