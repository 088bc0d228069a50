use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use crate::core::{AppError, Result};
use crate::modules::plans::repositories::PlanRepository;
use crate::modules::subscriptions::models::{Subscription, SubscriptionStatus};
use crate::modules::subscriptions::repositories::SubscriptionRepository;

/// Subscription lifecycle: create when a client accepts a plan, pause,
/// resume, cancel. Status transitions are direct writes; cancellation is
/// terminal.
pub struct SubscriptionService {
    subscription_repo: Arc<dyn SubscriptionRepository>,
    plan_repo: Arc<dyn PlanRepository>,
}

impl SubscriptionService {
    pub fn new(
        subscription_repo: Arc<dyn SubscriptionRepository>,
        plan_repo: Arc<dyn PlanRepository>,
    ) -> Self {
        Self {
            subscription_repo,
            plan_repo,
        }
    }

    /// Create a subscription for a client accepting a plan.
    ///
    /// The next billing date is seeded one interval after `start`; one-time
    /// plans have none. Session counters come from the plan.
    pub async fn create_subscription(
        &self,
        client_id: &str,
        coach_id: &str,
        plan_id: &str,
        start: NaiveDate,
    ) -> Result<Subscription> {
        let plan = self
            .plan_repo
            .find_by_id(plan_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Plan '{}' not found", plan_id)))?;

        if !plan.is_active {
            return Err(AppError::validation(format!(
                "Plan '{}' is no longer offered",
                plan_id
            )));
        }

        if plan.coach_id != coach_id {
            return Err(AppError::validation(format!(
                "Plan '{}' does not belong to coach '{}'",
                plan_id, coach_id
            )));
        }

        let subscription = Subscription::new(
            client_id.to_string(),
            coach_id.to_string(),
            plan_id.to_string(),
            plan.interval.advance(start),
            plan.session_count,
        );

        let created = self.subscription_repo.create(&subscription).await?;

        info!(
            subscription_id = %created.id,
            plan_id = %plan_id,
            client_id = %client_id,
            "Subscription created"
        );

        Ok(created)
    }

    /// Get subscription by ID
    pub async fn get_subscription(&self, subscription_id: &str) -> Result<Subscription> {
        self.subscription_repo
            .find_by_id(subscription_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Subscription '{}' not found", subscription_id))
            })
    }

    /// List a coach's subscriptions
    pub async fn list_subscriptions(&self, coach_id: &str) -> Result<Vec<Subscription>> {
        self.subscription_repo.list_by_coach(coach_id).await
    }

    /// Pause an active subscription
    pub async fn pause(&self, subscription_id: &str) -> Result<Subscription> {
        self.transition(subscription_id, SubscriptionStatus::Paused)
            .await
    }

    /// Resume a paused subscription, rescheduling billing from `from`
    pub async fn resume(&self, subscription_id: &str, from: NaiveDate) -> Result<Subscription> {
        let mut subscription = self.get_subscription(subscription_id).await?;

        if subscription.status == SubscriptionStatus::Cancelled {
            return Err(AppError::validation(
                "Cancelled subscriptions cannot be resumed",
            ));
        }

        let plan = self
            .plan_repo
            .find_by_id(&subscription.plan_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Plan '{}' not found", subscription.plan_id))
            })?;

        subscription.status = SubscriptionStatus::Active;
        subscription.next_billing_date = plan.interval.advance(from);
        subscription.updated_at = chrono::Utc::now();

        let updated = self.subscription_repo.update(&subscription).await?;

        info!(subscription_id = %subscription_id, "Subscription resumed");

        Ok(updated)
    }

    /// Cancel a subscription. Terminal; billing stops immediately.
    pub async fn cancel(&self, subscription_id: &str) -> Result<Subscription> {
        let mut subscription = self.get_subscription(subscription_id).await?;

        if subscription.status == SubscriptionStatus::Cancelled {
            return Ok(subscription);
        }

        subscription.status = SubscriptionStatus::Cancelled;
        subscription.next_billing_date = None;
        subscription.updated_at = chrono::Utc::now();

        let updated = self.subscription_repo.update(&subscription).await?;

        info!(subscription_id = %subscription_id, "Subscription cancelled");

        Ok(updated)
    }

    /// Roll the next billing date forward one plan interval.
    ///
    /// Called by the external auto-generation driver after it has produced
    /// the invoice for the current period.
    pub async fn advance_billing_period(&self, subscription_id: &str) -> Result<Subscription> {
        let mut subscription = self.get_subscription(subscription_id).await?;

        if subscription.status != SubscriptionStatus::Active {
            return Err(AppError::validation(format!(
                "Cannot advance billing on a {} subscription",
                subscription.status
            )));
        }

        let current = subscription.next_billing_date.ok_or_else(|| {
            AppError::validation("One-time subscriptions have no billing period to advance")
        })?;

        let plan = self
            .plan_repo
            .find_by_id(&subscription.plan_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Plan '{}' not found", subscription.plan_id))
            })?;

        subscription.next_billing_date = plan.interval.advance(current);
        subscription.updated_at = chrono::Utc::now();

        self.subscription_repo.update(&subscription).await
    }

    /// Consume one session from a session-based subscription.
    ///
    /// Unlimited subscriptions (no counter) are unaffected.
    pub async fn consume_session(&self, subscription_id: &str) -> Result<Subscription> {
        let mut subscription = self.get_subscription(subscription_id).await?;

        match subscription.sessions_remaining {
            None => Ok(subscription),
            Some(0) => Err(AppError::validation(format!(
                "Subscription '{}' has no sessions remaining",
                subscription_id
            ))),
            Some(count) => {
                subscription.sessions_remaining = Some(count - 1);
                subscription.updated_at = chrono::Utc::now();
                self.subscription_repo.update(&subscription).await
            }
        }
    }

    async fn transition(
        &self,
        subscription_id: &str,
        status: SubscriptionStatus,
    ) -> Result<Subscription> {
        let mut subscription = self.get_subscription(subscription_id).await?;

        if subscription.status == SubscriptionStatus::Cancelled {
            return Err(AppError::validation(
                "Cancelled subscriptions cannot change status",
            ));
        }

        subscription.status = status;
        subscription.updated_at = chrono::Utc::now();

        self.subscription_repo.update(&subscription).await
    }
}
