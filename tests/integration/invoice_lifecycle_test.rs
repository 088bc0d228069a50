// Integration tests for the invoice lifecycle: numbering, status
// transitions and item replacement.

use std::sync::Arc;

use chrono::{Duration, Utc};
use coachbill::core::{AppError, Currency};
use coachbill::invoices::{
    InvoiceService, InvoiceStatus, MemoryInvoiceRepository, NewInvoiceItem,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn service() -> InvoiceService {
    InvoiceService::new(Arc::new(MemoryInvoiceRepository::new()))
}

fn single_item(amount: i64) -> Vec<NewInvoiceItem> {
    vec![NewInvoiceItem {
        description: "Coaching session".to_string(),
        quantity: 1,
        unit_price: Decimal::from(amount),
    }]
}

#[tokio::test]
async fn test_invoice_numbers_are_monotonic_and_scoped_per_coach() {
    let service = service();
    let due = (Utc::now() + Duration::days(14)).date_naive();

    for expected in ["INV-000001", "INV-000002", "INV-000003"] {
        let invoice = service
            .create_invoice(
                "coach-a",
                "client-1",
                single_item(100),
                due,
                Currency::EUR,
                None,
                None,
            )
            .await
            .unwrap();
        assert_eq!(invoice.invoice_number, expected);
    }

    // A different coach starts its own sequence
    let invoice = service
        .create_invoice(
            "coach-b",
            "client-9",
            single_item(50),
            due,
            Currency::GBP,
            None,
            None,
        )
        .await
        .unwrap();
    assert_eq!(invoice.invoice_number, "INV-000001");
}

#[tokio::test]
async fn test_draft_sent_paid_transition_chain() {
    let service = service();
    let due = (Utc::now() + Duration::days(14)).date_naive();

    let invoice = service
        .create_invoice(
            "coach-a",
            "client-1",
            single_item(100),
            due,
            Currency::EUR,
            None,
            None,
        )
        .await
        .unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Draft);

    let sent = service.mark_sent(&invoice.id).await.unwrap();
    assert_eq!(sent.status, InvoiceStatus::Sent);

    let paid = service.mark_paid(&invoice.id, None).await.unwrap();
    assert_eq!(paid.status, InvoiceStatus::Paid);
    assert_eq!(paid.amount_paid, paid.amount_total);

    // A paid invoice cannot be re-sent
    let result = service.mark_sent(&invoice.id).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_overdue_transition_for_past_due_invoice() {
    let service = service();
    let past_due = (Utc::now() - Duration::days(5)).date_naive();

    let invoice = service
        .create_invoice(
            "coach-a",
            "client-1",
            single_item(100),
            past_due,
            Currency::EUR,
            None,
            None,
        )
        .await
        .unwrap();
    service.mark_sent(&invoice.id).await.unwrap();

    let overdue = service.mark_overdue(&invoice.id).await.unwrap();
    assert_eq!(overdue.status, InvoiceStatus::Overdue);

    // Idempotent on an already-overdue invoice
    let again = service.mark_overdue(&invoice.id).await.unwrap();
    assert_eq!(again.status, InvoiceStatus::Overdue);

    // Settling afterwards clears the overdue state
    let paid = service.mark_paid(&invoice.id, None).await.unwrap();
    assert_eq!(paid.status, InvoiceStatus::Paid);
    let result = service.mark_overdue(&invoice.id).await.unwrap();
    assert_eq!(result.status, InvoiceStatus::Paid);
}

#[tokio::test]
async fn test_create_invoice_validation_errors() {
    let service = service();
    let due = (Utc::now() + Duration::days(14)).date_naive();

    let empty = service
        .create_invoice("coach-a", "client-1", vec![], due, Currency::EUR, None, None)
        .await;
    assert!(matches!(empty, Err(AppError::Validation(_))));

    let zero_total = service
        .create_invoice(
            "coach-a",
            "client-1",
            single_item(0),
            due,
            Currency::EUR,
            None,
            None,
        )
        .await;
    assert!(matches!(zero_total, Err(AppError::Validation(_))));

    let bad_quantity = service
        .create_invoice(
            "coach-a",
            "client-1",
            vec![NewInvoiceItem {
                description: "Session".to_string(),
                quantity: 0,
                unit_price: dec!(50),
            }],
            due,
            Currency::EUR,
            None,
            None,
        )
        .await;
    assert!(matches!(bad_quantity, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_replace_items_recomputes_total_and_keeps_number() {
    let service = service();
    let due = (Utc::now() + Duration::days(14)).date_naive();

    let invoice = service
        .create_invoice(
            "coach-a",
            "client-1",
            single_item(100),
            due,
            Currency::EUR,
            None,
            None,
        )
        .await
        .unwrap();

    let updated = service
        .replace_items(
            &invoice.id,
            vec![
                NewInvoiceItem {
                    description: "Block of 5 sessions".to_string(),
                    quantity: 5,
                    unit_price: dec!(90),
                },
                NewInvoiceItem {
                    description: "Nutrition plan".to_string(),
                    quantity: 1,
                    unit_price: dec!(49.50),
                },
            ],
        )
        .await
        .unwrap();

    assert_eq!(updated.amount_total, dec!(499.50));
    assert_eq!(updated.invoice_number, invoice.invoice_number);
    assert_eq!(updated.items.len(), 2);

    // Sending freezes the item list
    service.mark_sent(&invoice.id).await.unwrap();
    let frozen = service.replace_items(&invoice.id, single_item(10)).await;
    assert!(matches!(frozen, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_get_unknown_invoice_is_not_found() {
    let service = service();

    let result = service.get_invoice("missing").await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}
