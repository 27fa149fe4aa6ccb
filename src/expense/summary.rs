//! Groups a user's expenses by month and category.

use std::collections::BTreeMap;

use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::{
    Error,
    expense::{Category, OwnerScope},
};

/// Per-month, per-category totals: month key ("YYYY-MM") to category to sum.
///
/// BTreeMaps keep months and categories in ascending order so the report
/// serializes deterministically. Months and categories without records are
/// simply absent.
pub type MonthlySummary = BTreeMap<String, BTreeMap<Category, Decimal>>;

/// Total the expenses of the user in `scope` per month and category.
///
/// The month key is computed in SQL, but the sums are accumulated here with
/// [Decimal] arithmetic. Summing in SQL would coerce the amounts to REAL and
/// accumulate float error; cent amounts must add up exactly.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn summarize_by_month(
    scope: &OwnerScope,
    connection: &Connection,
) -> Result<MonthlySummary, Error> {
    let owner = scope.owner();
    let mut statement = connection.prepare(
        "SELECT strftime('%Y-%m', date), category, amount FROM expense WHERE user_id = :owner",
    )?;
    let rows = statement.query_map(&[(":owner", &owner)], |row| {
        let month: String = row.get(0)?;
        let category: Category = row.get(1)?;
        let amount_text: String = row.get(2)?;
        let amount: Decimal = amount_text.parse().map_err(|error| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                Box::new(error),
            )
        })?;

        Ok((month, category, amount))
    })?;

    let mut summary = MonthlySummary::new();

    for row in rows {
        let (month, category, amount) = row?;
        let total = summary
            .entry(month)
            .or_default()
            .entry(category)
            .or_insert(Decimal::ZERO);
        *total += amount;
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use time::{Date, macros::date};

    use crate::{
        initialize_db,
        expense::{
            Category, OwnerScope,
            core::{ExpenseForm, create_expense},
            summary::summarize_by_month,
        },
        user::insert_user,
    };

    fn record(
        amount: Decimal,
        category: &str,
        date: Date,
        scope: &OwnerScope,
        connection: &Connection,
    ) {
        let form = ExpenseForm {
            amount,
            category: category.to_owned(),
            description: String::new(),
            date,
        };

        create_expense(form.validate().unwrap(), scope, connection).unwrap();
    }

    fn get_test_connection() -> (Connection, OwnerScope) {
        let connection = Connection::open_in_memory().unwrap();
        initialize_db(&connection).unwrap();
        let user = insert_user("alice@example.com", "Alice", "nothashed", &connection).unwrap();

        (connection, OwnerScope::for_user(user.id))
    }

    #[test]
    fn sums_per_month_and_category() {
        let (connection, alice) = get_test_connection();
        record(dec!(100.00), "FOOD", date!(2025 - 08 - 01), &alice, &connection);
        record(dec!(50.00), "FOOD", date!(2025 - 08 - 02), &alice, &connection);
        record(dec!(500.00), "RENT", date!(2025 - 08 - 01), &alice, &connection);

        let summary = summarize_by_month(&alice, &connection).unwrap();

        assert_eq!(summary.len(), 1);
        let august = &summary["2025-08"];
        assert_eq!(august.len(), 2);
        assert_eq!(august[&Category::Food], dec!(150.00));
        assert_eq!(august[&Category::Rent], dec!(500.00));
    }

    #[test]
    fn splits_months_and_skips_empty_ones() {
        let (connection, alice) = get_test_connection();
        record(dec!(10.00), "BILLS", date!(2025 - 06 - 30), &alice, &connection);
        record(dec!(20.00), "BILLS", date!(2025 - 08 - 01), &alice, &connection);

        let summary = summarize_by_month(&alice, &connection).unwrap();

        let months: Vec<_> = summary.keys().cloned().collect();
        assert_eq!(months, vec!["2025-06", "2025-08"]);
    }

    #[test]
    fn cent_amounts_add_up_exactly() {
        let (connection, alice) = get_test_connection();
        // 0.10 + 0.20 + 0.01 drifts to 0.31000000000000005 in f64 arithmetic.
        record(dec!(0.10), "OTHER", date!(2025 - 08 - 01), &alice, &connection);
        record(dec!(0.20), "OTHER", date!(2025 - 08 - 02), &alice, &connection);
        record(dec!(0.01), "OTHER", date!(2025 - 08 - 03), &alice, &connection);

        let summary = summarize_by_month(&alice, &connection).unwrap();

        assert_eq!(summary["2025-08"][&Category::Other].to_string(), "0.31");
    }

    #[test]
    fn only_the_owners_records_are_summed() {
        let (connection, alice) = get_test_connection();
        let bob = insert_user("bob@example.com", "Bob", "nothashed", &connection).unwrap();
        let bob = OwnerScope::for_user(bob.id);
        record(dec!(100.00), "FOOD", date!(2025 - 08 - 01), &alice, &connection);
        record(dec!(999.00), "FOOD", date!(2025 - 08 - 01), &bob, &connection);

        let summary = summarize_by_month(&alice, &connection).unwrap();

        assert_eq!(summary["2025-08"][&Category::Food], dec!(100.00));
    }

    #[test]
    fn no_records_means_an_empty_summary() {
        let (connection, alice) = get_test_connection();

        let summary = summarize_by_month(&alice, &connection).unwrap();

        assert!(summary.is_empty());
    }

    #[test]
    fn serializes_with_amounts_as_strings() {
        let (connection, alice) = get_test_connection();
        record(dec!(100.00), "FOOD", date!(2025 - 08 - 01), &alice, &connection);
        record(dec!(50.00), "FOOD", date!(2025 - 08 - 02), &alice, &connection);
        record(dec!(500.00), "RENT", date!(2025 - 08 - 01), &alice, &connection);

        let summary = summarize_by_month(&alice, &connection).unwrap();

        assert_eq!(
            serde_json::to_value(&summary).unwrap(),
            serde_json::json!({
                "2025-08": { "FOOD": "150.00", "RENT": "500.00" }
            })
        );
    }
}
