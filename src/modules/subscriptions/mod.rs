// Subscriptions module

pub mod models;
pub mod repositories;
pub mod services;

pub use models::{Subscription, SubscriptionStatus};
pub use repositories::{
    MemorySubscriptionRepository, MySqlSubscriptionRepository, SubscriptionRepository,
};
pub use services::SubscriptionService;
