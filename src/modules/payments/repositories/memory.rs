// In-memory payment repository for tests and the simulated deployment mode.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::core::{AppError, Result};
use crate::modules::payments::models::{Payment, PaymentStatus};

use super::payment_repository::PaymentRepository;

/// In-memory payment repository
#[derive(Default)]
pub struct MemoryPaymentRepository {
    payments: Mutex<HashMap<String, Payment>>,
}

impl MemoryPaymentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentRepository for MemoryPaymentRepository {
    async fn create(&self, payment: &Payment) -> Result<Payment> {
        let mut payments = self.payments.lock().await;
        payments.insert(payment.id.clone(), payment.clone());
        Ok(payment.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Payment>> {
        let payments = self.payments.lock().await;
        Ok(payments.get(id).cloned())
    }

    async fn list_by_invoice(&self, invoice_id: &str) -> Result<Vec<Payment>> {
        let payments = self.payments.lock().await;
        let mut matching: Vec<Payment> = payments
            .values()
            .filter(|payment| payment.invoice_id == invoice_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.processed_at.cmp(&b.processed_at));
        Ok(matching)
    }

    async fn mark_failed(&self, id: &str, reason: &str) -> Result<()> {
        let mut payments = self.payments.lock().await;
        let payment = payments
            .get_mut(id)
            .ok_or_else(|| AppError::not_found(format!("Payment with id '{}' not found", id)))?;

        payment.status = PaymentStatus::Failed;
        payment.failure_reason = Some(reason.to_string());
        Ok(())
    }
}
