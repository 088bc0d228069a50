// Per-coach payment settings: gateway credentials (opaque to this core),
// enabled payment methods, the reminder schedule and the company profile
// used for invoice display.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::modules::payments::models::PaymentMethod;
use crate::modules::reminders::models::ReminderSchedule;

/// Company details printed on invoices; the document renderer consumes them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub company_name: String,
    pub address: String,
    pub email: String,
    pub phone: Option<String>,
    pub vat_id: Option<String>,
}

/// Per-coach payment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSettings {
    pub coach_id: String,

    /// Gateway credentials, opaque to the billing core
    pub gateway_credentials: serde_json::Value,

    /// Methods the coach accepts; empty means none
    pub enabled_methods: Vec<PaymentMethod>,

    pub reminder_schedule: ReminderSchedule,

    pub company_profile: CompanyProfile,

    /// Whether invoices are generated automatically from subscriptions
    pub auto_generate_invoices: bool,

    pub updated_at: DateTime<Utc>,
}

impl PaymentSettings {
    pub fn new(
        coach_id: String,
        gateway_credentials: serde_json::Value,
        enabled_methods: Vec<PaymentMethod>,
        reminder_schedule: ReminderSchedule,
        company_profile: CompanyProfile,
        auto_generate_invoices: bool,
    ) -> Self {
        Self {
            coach_id,
            gateway_credentials,
            enabled_methods,
            reminder_schedule,
            company_profile,
            auto_generate_invoices,
            updated_at: Utc::now(),
        }
    }

    /// Whether the coach accepts the given method
    pub fn method_enabled(&self, method: PaymentMethod) -> bool {
        self.enabled_methods.contains(&method)
    }
}
