pub mod memory;
pub mod subscription_repository;

pub use memory::MemorySubscriptionRepository;
pub use subscription_repository::{MySqlSubscriptionRepository, SubscriptionRepository};
