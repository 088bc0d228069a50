// In-memory plan repository for tests and the simulated deployment mode.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::core::{AppError, Result};
use crate::modules::plans::models::PricingPlan;

use super::plan_repository::PlanRepository;

/// In-memory plan repository
#[derive(Default)]
pub struct MemoryPlanRepository {
    plans: Mutex<HashMap<String, PricingPlan>>,
}

impl MemoryPlanRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlanRepository for MemoryPlanRepository {
    async fn create(&self, plan: &PricingPlan) -> Result<PricingPlan> {
        let mut plans = self.plans.lock().await;
        plans.insert(plan.id.clone(), plan.clone());
        Ok(plan.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<PricingPlan>> {
        let plans = self.plans.lock().await;
        Ok(plans.get(id).cloned())
    }

    async fn update(&self, plan: &PricingPlan) -> Result<PricingPlan> {
        let mut plans = self.plans.lock().await;
        if !plans.contains_key(&plan.id) {
            return Err(AppError::not_found(format!(
                "Plan with id '{}' not found",
                plan.id
            )));
        }

        plans.insert(plan.id.clone(), plan.clone());
        Ok(plan.clone())
    }

    async fn list_by_coach(&self, coach_id: &str, active_only: bool) -> Result<Vec<PricingPlan>> {
        let plans = self.plans.lock().await;
        let mut matching: Vec<PricingPlan> = plans
            .values()
            .filter(|plan| plan.coach_id == coach_id && (!active_only || plan.is_active))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }
}
