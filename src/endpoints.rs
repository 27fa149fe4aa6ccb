//! The endpoints (paths) for the application's routes.

/// Create a new user account.
pub const REGISTER: &str = "/register";

/// Exchange credentials for access and refresh tokens.
pub const LOGIN: &str = "/login";

/// Create an expense (POST) or list expenses (GET).
pub const EXPENSES: &str = "/expenses";

/// Fetch (GET), replace (PUT) or delete (DELETE) a single expense.
pub const EXPENSE: &str = "/expenses/{expense_id}";

/// The per-month, per-category totals for the authenticated user.
pub const MONTHLY_SUMMARY: &str = "/summary/monthly";

/// Format an endpoint that takes a single path parameter.
#[cfg(test)]
pub fn format_endpoint(endpoint: &str, value: i64) -> String {
    let start = endpoint
        .find('{')
        .expect("endpoint should contain a path parameter");
    let end = endpoint
        .find('}')
        .expect("endpoint should contain a path parameter");

    format!(
        "{}{}{}",
        &endpoint[..start],
        value,
        &endpoint[end + 1..]
    )
}
