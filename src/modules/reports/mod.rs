// Reports module

pub mod models;
pub mod services;

pub use models::{CategoryRevenue, ClientRevenue, FinancialStats, MonthlyRevenue, OverdueSummary};
pub use services::ReportService;
