pub mod financial_report;

pub use financial_report::{
    CategoryRevenue, ClientRevenue, FinancialStats, MonthlyRevenue, OverdueSummary,
};
