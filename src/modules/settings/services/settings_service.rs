use std::sync::Arc;

use tracing::info;

use crate::core::Result;
use crate::modules::payments::models::PaymentMethod;
use crate::modules::reminders::models::ReminderSchedule;
use crate::modules::settings::models::{CompanyProfile, PaymentSettings};
use crate::modules::settings::repositories::SettingsRepository;

/// Service for per-coach payment settings
pub struct SettingsService {
    settings_repo: Arc<dyn SettingsRepository>,
}

impl SettingsService {
    pub fn new(settings_repo: Arc<dyn SettingsRepository>) -> Self {
        Self { settings_repo }
    }

    /// Create or replace a coach's payment settings.
    ///
    /// The reminder schedule arrives pre-validated: `ReminderSchedule::new`
    /// is the only way to build one with custom offsets.
    pub async fn upsert_settings(
        &self,
        coach_id: &str,
        gateway_credentials: serde_json::Value,
        enabled_methods: Vec<PaymentMethod>,
        reminder_schedule: ReminderSchedule,
        company_profile: CompanyProfile,
        auto_generate_invoices: bool,
    ) -> Result<PaymentSettings> {
        let settings = PaymentSettings::new(
            coach_id.to_string(),
            gateway_credentials,
            enabled_methods,
            reminder_schedule,
            company_profile,
            auto_generate_invoices,
        );

        let stored = self.settings_repo.upsert(&settings).await?;

        info!(coach_id = %coach_id, "Payment settings updated");

        Ok(stored)
    }

    /// Settings for a coach, when configured
    pub async fn get_settings(&self, coach_id: &str) -> Result<Option<PaymentSettings>> {
        self.settings_repo.find_by_coach(coach_id).await
    }

    /// Whether a coach accepts a payment method.
    ///
    /// A coach without stored settings imposes no restriction.
    pub async fn method_enabled(&self, coach_id: &str, method: PaymentMethod) -> Result<bool> {
        Ok(self
            .settings_repo
            .find_by_coach(coach_id)
            .await?
            .map(|settings| settings.method_enabled(method))
            .unwrap_or(true))
    }
}
