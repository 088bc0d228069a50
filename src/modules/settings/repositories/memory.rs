// In-memory settings repository for tests and the simulated deployment mode.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::core::Result;
use crate::modules::settings::models::PaymentSettings;

use super::settings_repository::SettingsRepository;

/// In-memory settings repository
#[derive(Default)]
pub struct MemorySettingsRepository {
    settings: Mutex<HashMap<String, PaymentSettings>>,
}

impl MemorySettingsRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsRepository for MemorySettingsRepository {
    async fn upsert(&self, settings: &PaymentSettings) -> Result<PaymentSettings> {
        let mut stored = self.settings.lock().await;
        stored.insert(settings.coach_id.clone(), settings.clone());
        Ok(settings.clone())
    }

    async fn find_by_coach(&self, coach_id: &str) -> Result<Option<PaymentSettings>> {
        let stored = self.settings.lock().await;
        Ok(stored.get(coach_id).cloned())
    }
}
