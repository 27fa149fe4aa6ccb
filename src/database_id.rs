//! Type aliases for rows IDs to make function signatures more meaningful.

/// The integer row ID assigned by SQLite.
pub type DatabaseId = i64;

/// The ID of a row in the expense table.
pub type ExpenseId = DatabaseId;

/// The ID of a row in the user table.
pub type UserId = DatabaseId;
