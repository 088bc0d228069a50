use async_trait::async_trait;
use sqlx::{MySqlPool, Row};
use std::str::FromStr;

use crate::core::{AppError, Result};
use crate::modules::payments::models::PaymentMethod;
use crate::modules::settings::models::{CompanyProfile, PaymentSettings};

/// Ledger-store boundary for per-coach payment settings
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Insert or replace the settings row for a coach
    async fn upsert(&self, settings: &PaymentSettings) -> Result<PaymentSettings>;

    /// Find settings for a coach
    async fn find_by_coach(&self, coach_id: &str) -> Result<Option<PaymentSettings>>;
}

/// MySQL-backed settings repository.
///
/// Structured sub-objects (credentials, schedule, profile, methods) are
/// stored as JSON columns.
pub struct MySqlSettingsRepository {
    pool: MySqlPool,
}

impl MySqlSettingsRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsRepository for MySqlSettingsRepository {
    async fn upsert(&self, settings: &PaymentSettings) -> Result<PaymentSettings> {
        let enabled_methods: Vec<String> = settings
            .enabled_methods
            .iter()
            .map(|m| m.to_string())
            .collect();

        sqlx::query(
            r#"
            INSERT INTO payment_settings (
                coach_id, gateway_credentials, enabled_methods,
                reminder_schedule, company_profile, auto_generate_invoices,
                updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                gateway_credentials = VALUES(gateway_credentials),
                enabled_methods = VALUES(enabled_methods),
                reminder_schedule = VALUES(reminder_schedule),
                company_profile = VALUES(company_profile),
                auto_generate_invoices = VALUES(auto_generate_invoices),
                updated_at = VALUES(updated_at)
            "#,
        )
        .bind(&settings.coach_id)
        .bind(serde_json::to_string(&settings.gateway_credentials)?)
        .bind(serde_json::to_string(&enabled_methods)?)
        .bind(serde_json::to_string(&settings.reminder_schedule)?)
        .bind(serde_json::to_string(&settings.company_profile)?)
        .bind(settings.auto_generate_invoices)
        .bind(settings.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(settings.clone())
    }

    async fn find_by_coach(&self, coach_id: &str) -> Result<Option<PaymentSettings>> {
        let row = sqlx::query(
            r#"
            SELECT coach_id, gateway_credentials, enabled_methods,
                   reminder_schedule, company_profile, auto_generate_invoices,
                   updated_at
            FROM payment_settings
            WHERE coach_id = ?
            "#,
        )
        .bind(coach_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let credentials: String = row.try_get("gateway_credentials")?;
        let methods: String = row.try_get("enabled_methods")?;
        let schedule: String = row.try_get("reminder_schedule")?;
        let profile: String = row.try_get("company_profile")?;

        let method_names: Vec<String> = serde_json::from_str(&methods)?;
        let enabled_methods = method_names
            .iter()
            .map(|name| {
                PaymentMethod::from_str(name)
                    .map_err(|e| AppError::internal(format!("Invalid method in database: {}", e)))
            })
            .collect::<Result<Vec<PaymentMethod>>>()?;

        let company_profile: CompanyProfile = serde_json::from_str(&profile)?;

        Ok(Some(PaymentSettings {
            coach_id: row.try_get("coach_id")?,
            gateway_credentials: serde_json::from_str(&credentials)?,
            enabled_methods,
            reminder_schedule: serde_json::from_str(&schedule)?,
            company_profile,
            auto_generate_invoices: row.try_get("auto_generate_invoices")?,
            updated_at: row.try_get("updated_at")?,
        }))
    }
}
