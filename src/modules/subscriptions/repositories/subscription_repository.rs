use async_trait::async_trait;
use sqlx::{MySqlPool, Row};
use std::str::FromStr;

use crate::core::{AppError, Result};
use crate::modules::subscriptions::models::{Subscription, SubscriptionStatus};

/// Ledger-store boundary for subscriptions
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Persist a new subscription
    async fn create(&self, subscription: &Subscription) -> Result<Subscription>;

    /// Find subscription by ID
    async fn find_by_id(&self, id: &str) -> Result<Option<Subscription>>;

    /// Replace a stored subscription
    async fn update(&self, subscription: &Subscription) -> Result<Subscription>;

    /// List subscriptions belonging to a coach
    async fn list_by_coach(&self, coach_id: &str) -> Result<Vec<Subscription>>;
}

/// MySQL-backed subscription repository
pub struct MySqlSubscriptionRepository {
    pool: MySqlPool,
}

impl MySqlSubscriptionRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_subscription(row: &sqlx::mysql::MySqlRow) -> Result<Subscription> {
        let status: String = row.try_get("status")?;

        Ok(Subscription {
            id: row.try_get("id")?,
            client_id: row.try_get("client_id")?,
            coach_id: row.try_get("coach_id")?,
            plan_id: row.try_get("plan_id")?,
            status: SubscriptionStatus::from_str(&status)
                .map_err(|e| AppError::internal(format!("Invalid status in database: {}", e)))?,
            next_billing_date: row.try_get("next_billing_date")?,
            sessions_remaining: row.try_get("sessions_remaining")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl SubscriptionRepository for MySqlSubscriptionRepository {
    async fn create(&self, subscription: &Subscription) -> Result<Subscription> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions (
                id, client_id, coach_id, plan_id, status,
                next_billing_date, sessions_remaining, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&subscription.id)
        .bind(&subscription.client_id)
        .bind(&subscription.coach_id)
        .bind(&subscription.plan_id)
        .bind(subscription.status.to_string())
        .bind(subscription.next_billing_date)
        .bind(subscription.sessions_remaining)
        .bind(subscription.created_at)
        .bind(subscription.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(subscription.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Subscription>> {
        let row = sqlx::query(
            r#"
            SELECT id, client_id, coach_id, plan_id, status,
                   next_billing_date, sessions_remaining, created_at, updated_at
            FROM subscriptions
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| Self::row_to_subscription(&row)).transpose()
    }

    async fn update(&self, subscription: &Subscription) -> Result<Subscription> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET status = ?, next_billing_date = ?, sessions_remaining = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(subscription.status.to_string())
        .bind(subscription.next_billing_date)
        .bind(subscription.sessions_remaining)
        .bind(subscription.updated_at)
        .bind(&subscription.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Subscription with id '{}' not found",
                subscription.id
            )));
        }

        Ok(subscription.clone())
    }

    async fn list_by_coach(&self, coach_id: &str) -> Result<Vec<Subscription>> {
        let rows = sqlx::query(
            r#"
            SELECT id, client_id, coach_id, plan_id, status,
                   next_billing_date, sessions_remaining, created_at, updated_at
            FROM subscriptions
            WHERE coach_id = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(coach_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_subscription).collect()
    }
}
