// Plans module

pub mod models;
pub mod repositories;
pub mod services;

pub use models::{BillingInterval, PricingPlan};
pub use repositories::{MemoryPlanRepository, MySqlPlanRepository, PlanRepository};
pub use services::{PlanService, PlanUpdate};
