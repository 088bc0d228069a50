use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;

use crate::core::{AppError, Currency, Result};
use crate::modules::plans::models::{BillingInterval, PricingPlan};
use crate::modules::plans::repositories::PlanRepository;

/// Fields a coach may change on an existing plan.
///
/// Currency and billing interval are fixed at creation; historical invoices
/// and live subscriptions price against them.
#[derive(Debug, Clone, Default)]
pub struct PlanUpdate {
    pub name: Option<String>,
    pub amount: Option<Decimal>,
    pub session_count: Option<Option<i32>>,
    pub features: Option<Vec<String>>,
}

/// Service for a coach's pricing plans
pub struct PlanService {
    plan_repo: Arc<dyn PlanRepository>,
}

impl PlanService {
    pub fn new(plan_repo: Arc<dyn PlanRepository>) -> Self {
        Self { plan_repo }
    }

    /// Create a new active plan
    pub async fn create_plan(
        &self,
        coach_id: &str,
        name: &str,
        amount: Decimal,
        currency: Currency,
        interval: BillingInterval,
        session_count: Option<i32>,
        features: Vec<String>,
    ) -> Result<PricingPlan> {
        let plan = PricingPlan::new(
            coach_id.to_string(),
            name.to_string(),
            amount,
            currency,
            interval,
            session_count,
            features,
        )?;

        let created = self.plan_repo.create(&plan).await?;

        info!(plan_id = %created.id, coach_id = %coach_id, "Pricing plan created");

        Ok(created)
    }

    /// Get plan by ID
    pub async fn get_plan(&self, plan_id: &str) -> Result<PricingPlan> {
        self.plan_repo
            .find_by_id(plan_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Plan '{}' not found", plan_id)))
    }

    /// Edit an existing plan
    pub async fn update_plan(&self, plan_id: &str, update: PlanUpdate) -> Result<PricingPlan> {
        let mut plan = self.get_plan(plan_id).await?;

        if let Some(name) = update.name {
            if name.trim().is_empty() {
                return Err(AppError::validation("Plan name cannot be empty"));
            }
            plan.name = name;
        }

        if let Some(amount) = update.amount {
            if amount <= Decimal::ZERO {
                return Err(AppError::validation(format!(
                    "Plan amount must be positive, got: {}",
                    amount
                )));
            }
            plan.amount = plan.currency.round(amount);
        }

        if let Some(session_count) = update.session_count {
            if let Some(count) = session_count {
                if count < 1 {
                    return Err(AppError::validation(format!(
                        "Session count must be at least 1, got: {}",
                        count
                    )));
                }
            }
            plan.session_count = session_count;
        }

        if let Some(features) = update.features {
            plan.features = features;
        }

        plan.updated_at = chrono::Utc::now();

        self.plan_repo.update(&plan).await
    }

    /// Soft-delete a plan by clearing is_active.
    ///
    /// Plans are never hard-deleted; invoices and subscriptions keep
    /// referencing them. Idempotent.
    pub async fn deactivate_plan(&self, plan_id: &str) -> Result<PricingPlan> {
        let mut plan = self.get_plan(plan_id).await?;

        if !plan.is_active {
            return Ok(plan);
        }

        plan.is_active = false;
        plan.updated_at = chrono::Utc::now();

        let updated = self.plan_repo.update(&plan).await?;

        info!(plan_id = %plan_id, "Pricing plan deactivated");

        Ok(updated)
    }

    /// List a coach's plans
    pub async fn list_plans(&self, coach_id: &str, active_only: bool) -> Result<Vec<PricingPlan>> {
        self.plan_repo.list_by_coach(coach_id, active_only).await
    }
}
