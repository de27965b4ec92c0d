// Expense Tracker - Core Library
// Exposes all modules for use in the CLI, API server, and tests

pub mod db;
pub mod insights;
pub mod reports;
pub mod schema;

// Re-export commonly used types
pub use db::{
    delete_expense, expense_count, get_all_expenses, get_expense, get_expenses_for_month,
    insert_expense, setup_database, update_expense, Expense, NewExpense,
};
pub use insights::{
    category_averages, category_totals, find_anomalies, overspending_suggestions, InsightConfig,
};
pub use reports::{monthly_trends, summary_report, CategoryLine, MonthTrend, SummaryReport};
pub use schema::{ExpensePayload, ValidationError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
