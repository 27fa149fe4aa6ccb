//! Everything to do with expense records: the data model and database
//! queries, the filter compiler for the listing endpoint, sorting and
//! pagination, the monthly summary, and the route handlers.

mod category;
mod core;
mod create_endpoint;
mod delete_endpoint;
mod filter;
mod get_endpoint;
mod list_endpoint;
mod query;
mod scope;
mod summary;
mod summary_endpoint;
mod update_endpoint;

pub use category::Category;
pub use self::core::{Expense, create_expense_table};
pub use create_endpoint::create_expense_endpoint;
pub use delete_endpoint::delete_expense_endpoint;
pub use filter::ExpenseFilter;
pub use get_endpoint::get_expense_endpoint;
pub use list_endpoint::list_expenses_endpoint;
pub use query::{ExpensePage, SortKey};
pub use scope::OwnerScope;
pub use summary::MonthlySummary;
pub use summary_endpoint::monthly_summary_endpoint;
pub use update_endpoint::update_expense_endpoint;
