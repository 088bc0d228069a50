use async_trait::async_trait;
use sqlx::{MySqlPool, Row};
use std::str::FromStr;

use crate::core::{AppError, Currency, Result};
use crate::modules::plans::models::{BillingInterval, PricingPlan};

/// Ledger-store boundary for pricing plans
#[async_trait]
pub trait PlanRepository: Send + Sync {
    /// Persist a new plan
    async fn create(&self, plan: &PricingPlan) -> Result<PricingPlan>;

    /// Find plan by ID
    async fn find_by_id(&self, id: &str) -> Result<Option<PricingPlan>>;

    /// Replace a stored plan
    async fn update(&self, plan: &PricingPlan) -> Result<PricingPlan>;

    /// List plans belonging to a coach
    async fn list_by_coach(&self, coach_id: &str, active_only: bool) -> Result<Vec<PricingPlan>>;
}

/// MySQL-backed plan repository
pub struct MySqlPlanRepository {
    pool: MySqlPool,
}

impl MySqlPlanRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_plan(row: &sqlx::mysql::MySqlRow) -> Result<PricingPlan> {
        let currency: String = row.try_get("currency")?;
        let interval: String = row.try_get("billing_interval")?;
        let features: String = row.try_get("features")?;

        Ok(PricingPlan {
            id: row.try_get("id")?,
            coach_id: row.try_get("coach_id")?,
            name: row.try_get("name")?,
            amount: row.try_get("amount")?,
            currency: Currency::from_str(&currency)
                .map_err(|e| AppError::internal(format!("Invalid currency in database: {}", e)))?,
            interval: BillingInterval::from_str(&interval)
                .map_err(|e| AppError::internal(format!("Invalid interval in database: {}", e)))?,
            session_count: row.try_get("session_count")?,
            features: serde_json::from_str(&features)?,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl PlanRepository for MySqlPlanRepository {
    async fn create(&self, plan: &PricingPlan) -> Result<PricingPlan> {
        sqlx::query(
            r#"
            INSERT INTO pricing_plans (
                id, coach_id, name, amount, currency, billing_interval,
                session_count, features, is_active, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&plan.id)
        .bind(&plan.coach_id)
        .bind(&plan.name)
        .bind(plan.amount)
        .bind(plan.currency.to_string())
        .bind(plan.interval.to_string())
        .bind(plan.session_count)
        .bind(serde_json::to_string(&plan.features)?)
        .bind(plan.is_active)
        .bind(plan.created_at)
        .bind(plan.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(plan.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<PricingPlan>> {
        let row = sqlx::query(
            r#"
            SELECT id, coach_id, name, amount, currency, billing_interval,
                   session_count, features, is_active, created_at, updated_at
            FROM pricing_plans
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| Self::row_to_plan(&row)).transpose()
    }

    async fn update(&self, plan: &PricingPlan) -> Result<PricingPlan> {
        let result = sqlx::query(
            r#"
            UPDATE pricing_plans
            SET name = ?, amount = ?, session_count = ?, features = ?,
                is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&plan.name)
        .bind(plan.amount)
        .bind(plan.session_count)
        .bind(serde_json::to_string(&plan.features)?)
        .bind(plan.is_active)
        .bind(plan.updated_at)
        .bind(&plan.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Plan with id '{}' not found",
                plan.id
            )));
        }

        Ok(plan.clone())
    }

    async fn list_by_coach(&self, coach_id: &str, active_only: bool) -> Result<Vec<PricingPlan>> {
        let query = if active_only {
            "SELECT id, coach_id, name, amount, currency, billing_interval, \
             session_count, features, is_active, created_at, updated_at \
             FROM pricing_plans WHERE coach_id = ? AND is_active = TRUE \
             ORDER BY created_at DESC"
        } else {
            "SELECT id, coach_id, name, amount, currency, billing_interval, \
             session_count, features, is_active, created_at, updated_at \
             FROM pricing_plans WHERE coach_id = ? ORDER BY created_at DESC"
        };

        let rows = sqlx::query(query)
            .bind(coach_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_plan).collect()
    }
}
