// In-memory subscription repository for tests and the simulated deployment
// mode.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::core::{AppError, Result};
use crate::modules::subscriptions::models::Subscription;

use super::subscription_repository::SubscriptionRepository;

/// In-memory subscription repository
#[derive(Default)]
pub struct MemorySubscriptionRepository {
    subscriptions: Mutex<HashMap<String, Subscription>>,
}

impl MemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriptionRepository for MemorySubscriptionRepository {
    async fn create(&self, subscription: &Subscription) -> Result<Subscription> {
        let mut subscriptions = self.subscriptions.lock().await;
        subscriptions.insert(subscription.id.clone(), subscription.clone());
        Ok(subscription.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Subscription>> {
        let subscriptions = self.subscriptions.lock().await;
        Ok(subscriptions.get(id).cloned())
    }

    async fn update(&self, subscription: &Subscription) -> Result<Subscription> {
        let mut subscriptions = self.subscriptions.lock().await;
        if !subscriptions.contains_key(&subscription.id) {
            return Err(AppError::not_found(format!(
                "Subscription with id '{}' not found",
                subscription.id
            )));
        }

        subscriptions.insert(subscription.id.clone(), subscription.clone());
        Ok(subscription.clone())
    }

    async fn list_by_coach(&self, coach_id: &str) -> Result<Vec<Subscription>> {
        let subscriptions = self.subscriptions.lock().await;
        let mut matching: Vec<Subscription> = subscriptions
            .values()
            .filter(|subscription| subscription.coach_id == coach_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }
}
