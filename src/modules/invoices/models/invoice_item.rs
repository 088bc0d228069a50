// An invoice item represents a single billed product or service.
// Each item calculates its own total from quantity × unit_price with
// rounding per the invoice currency scale.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Currency, Result};

/// Represents a single line item embedded in an invoice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceItem {
    /// Description of the product or service
    pub description: String,

    /// Quantity of items
    pub quantity: i32,

    /// Price per unit
    pub unit_price: Decimal,

    /// Calculated total (quantity × unit_price, rounded per currency)
    pub total: Decimal,
}

impl InvoiceItem {
    /// Create a new invoice item with validation
    ///
    /// # Arguments
    /// * `description` - Product/service description (max 255 chars)
    /// * `quantity` - Must be at least 1
    /// * `unit_price` - Must be non-negative
    /// * `currency` - Invoice currency, used for rounding the total
    pub fn new(
        description: String,
        quantity: i32,
        unit_price: Decimal,
        currency: Currency,
    ) -> Result<Self> {
        Self::validate_description(&description)?;
        Self::validate_quantity(quantity)?;
        Self::validate_unit_price(unit_price)?;

        let total = currency.round(Decimal::from(quantity) * unit_price);

        Ok(Self {
            description,
            quantity,
            unit_price,
            total,
        })
    }

    fn validate_description(description: &str) -> Result<()> {
        if description.trim().is_empty() {
            return Err(AppError::validation("Item description cannot be empty"));
        }

        if description.len() > 255 {
            return Err(AppError::validation(
                "Item description cannot exceed 255 characters",
            ));
        }

        Ok(())
    }

    fn validate_quantity(quantity: i32) -> Result<()> {
        if quantity < 1 {
            return Err(AppError::validation(format!(
                "Quantity must be at least 1, got: {}",
                quantity
            )));
        }

        Ok(())
    }

    fn validate_unit_price(unit_price: Decimal) -> Result<()> {
        if unit_price < Decimal::ZERO {
            return Err(AppError::validation(format!(
                "Unit price must be non-negative, got: {}",
                unit_price
            )));
        }

        Ok(())
    }
}
