pub mod use_analytics;
pub mod use_budgets;
pub mod use_categories;
pub mod use_transactions;
