pub mod memory;
pub mod plan_repository;

pub use memory::MemoryPlanRepository;
pub use plan_repository::{MySqlPlanRepository, PlanRepository};
