/// Property-based tests for invoice total calculation
///
/// Uses proptest to verify that an invoice total always equals the sum of
/// its item totals and that item arithmetic respects currency rounding.
use coachbill::core::Currency;
use coachbill::invoices::{Invoice, InvoiceItem};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn item(quantity: i32, unit_price: Decimal) -> InvoiceItem {
    InvoiceItem::new(
        "Coaching service".to_string(),
        quantity,
        unit_price,
        Currency::EUR,
    )
    .unwrap()
}

proptest! {
    /// Property: item total = quantity × unit_price, rounded to scale
    #[test]
    fn test_item_total_property(
        quantity in 1i32..1000i32,
        unit_price_cents in 0u32..10_000_00u32,
    ) {
        let unit_price = Decimal::from(unit_price_cents) / dec!(100);
        let item = item(quantity, unit_price);

        prop_assert_eq!(
            item.total,
            Currency::EUR.round(Decimal::from(quantity) * unit_price)
        );
        prop_assert!(item.total >= Decimal::ZERO);
    }

    /// Property: invoice total equals the sum of item totals
    #[test]
    fn test_invoice_total_is_item_sum(
        quantities in prop::collection::vec(1i32..50i32, 1..8),
        unit_price_cents in 1u32..500_00u32,
    ) {
        let unit_price = Decimal::from(unit_price_cents) / dec!(100);
        let items: Vec<InvoiceItem> = quantities
            .iter()
            .map(|&quantity| item(quantity, unit_price))
            .collect();

        let expected: Decimal = items.iter().map(|item| item.total).sum();
        let total = Invoice::sum_items(&items, Currency::EUR);

        prop_assert_eq!(total, Currency::EUR.round(expected));
        prop_assert!(total > Decimal::ZERO);
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_documented_example() {
        // Items [{qty:2, price:50}, {qty:1, price:25}] produce a 125 total
        let items = vec![item(2, dec!(50)), item(1, dec!(25))];

        assert_eq!(Invoice::sum_items(&items, Currency::EUR), dec!(125));
    }

    #[test]
    fn test_fractional_prices_round_per_item() {
        let items = vec![item(3, dec!(33.335)), item(1, dec!(0.005))];

        // 3 * 33.335 = 100.005 -> 100.00 (banker's rounding),
        // 1 * 0.005 = 0.005 -> 0.00, so the invoice total is 100.00
        assert_eq!(Invoice::sum_items(&items, Currency::EUR), dec!(100.00));
    }
}
