//! Defines the expense data model, payload validation, and the single-record
//! database queries.

use rusqlite::{Connection, Row};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    database_id::{ExpenseId, UserId},
    expense::{Category, OwnerScope},
};

// ============================================================================
// MODELS
// ============================================================================

/// The largest number of digits an amount may have, counting both sides of
/// the decimal point.
const MAX_AMOUNT_DIGITS: u32 = 10;

/// The number of digits after the decimal point every stored amount has.
const AMOUNT_SCALE: u32 = 2;

/// The longest description the store accepts, in characters.
const MAX_DESCRIPTION_LENGTH: usize = 255;

/// A single expense: money spent by one user on one day.
///
/// The owner is tracked in `user_id` but never serialized; clients only ever
/// see their own records, so repeating the owner in every response would say
/// nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// The ID of the expense.
    pub id: ExpenseId,
    /// The user the expense belongs to.
    #[serde(skip)]
    pub user_id: UserId,
    /// How much money was spent. Always carries exactly two decimal places.
    pub amount: Decimal,
    /// What the money was spent on.
    pub category: Category,
    /// Free-text notes. May be empty.
    pub description: String,
    /// The day the money was spent, as reported by the user.
    pub date: Date,
    /// When the record was created, in UTC. Set once, never updated.
    pub created_at: OffsetDateTime,
}

/// The request body for creating or replacing an expense.
///
/// Call [ExpenseForm::validate] to turn it into a [NewExpense] that the
/// database functions accept. The category arrives as a plain string so that
/// an unknown name surfaces as a field validation error rather than a
/// deserialization failure.
#[derive(Debug, Clone, Deserialize)]
pub struct ExpenseForm {
    /// How much money was spent.
    pub amount: Decimal,
    /// The name of the category, e.g. "FOOD".
    pub category: String,
    /// Free-text notes. Defaults to the empty string when absent.
    #[serde(default)]
    pub description: String,
    /// The day the money was spent, in ISO format (YYYY-MM-DD).
    pub date: Date,
}

/// A validated expense payload, ready to be written to the database.
///
/// The amount is strictly positive and rescaled to exactly two decimal
/// places, and the category is a known name. Only obtainable through
/// [ExpenseForm::validate].
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    amount: Decimal,
    category: Category,
    description: String,
    date: Date,
}

impl ExpenseForm {
    /// Check every field and produce a [NewExpense].
    ///
    /// # Errors
    /// Returns [Error::Validation] naming the first offending field.
    pub fn validate(self) -> Result<NewExpense, Error> {
        if self.amount <= Decimal::ZERO {
            return Err(Error::Validation {
                field: "amount",
                message: "Amount must be positive.".to_owned(),
            });
        }

        if self.amount.scale() > AMOUNT_SCALE {
            return Err(Error::Validation {
                field: "amount",
                message: format!(
                    "Ensure that there are no more than {AMOUNT_SCALE} decimal places."
                ),
            });
        }

        // Pad out to the canonical two decimal places, e.g. "5" -> "5.00".
        // Rescaling never rounds here since larger scales were rejected above.
        let mut amount = self.amount;
        amount.rescale(AMOUNT_SCALE);

        if amount.mantissa().unsigned_abs() >= 10u128.pow(MAX_AMOUNT_DIGITS) {
            return Err(Error::Validation {
                field: "amount",
                message: format!(
                    "Ensure that there are no more than {MAX_AMOUNT_DIGITS} digits in total."
                ),
            });
        }

        let category = self.category.parse().map_err(|_| Error::Validation {
            field: "category",
            message: format!("\"{}\" is not a valid choice.", self.category),
        })?;

        if self.description.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(Error::Validation {
                field: "description",
                message: format!(
                    "Ensure this field has no more than {MAX_DESCRIPTION_LENGTH} characters."
                ),
            });
        }

        Ok(NewExpense {
            amount,
            category,
            description: self.description,
            date: self.date,
        })
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new expense in the database, owned by the user in `scope`.
///
/// The owner always comes from `scope`, i.e. from the authenticated request;
/// there is no way for a payload to create a record for somebody else.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn create_expense(
    new_expense: NewExpense,
    scope: &OwnerScope,
    connection: &Connection,
) -> Result<Expense, Error> {
    let expense = connection
        .prepare(
            "INSERT INTO expense (user_id, amount, category, description, date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, user_id, amount, category, description, date, created_at",
        )?
        .query_row(
            (
                scope.owner(),
                new_expense.amount.to_string(),
                new_expense.category,
                new_expense.description,
                new_expense.date,
                OffsetDateTime::now_utc(),
            ),
            map_expense_row,
        )?;

    Ok(expense)
}

/// Retrieve an expense owned by the user in `scope` by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to an expense owned by the
///   scope's user (a record owned by someone else reports the same error),
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_expense(
    id: ExpenseId,
    scope: &OwnerScope,
    connection: &Connection,
) -> Result<Expense, Error> {
    let owner = scope.owner();
    let expense = connection
        .prepare(
            "SELECT id, user_id, amount, category, description, date, created_at
             FROM expense WHERE id = :id AND user_id = :owner",
        )?
        .query_one(&[(":id", &id), (":owner", &owner)], map_expense_row)?;

    Ok(expense)
}

/// Replace every user-editable field of an expense owned by the user in
/// `scope`.
///
/// The ID, owner, and creation time are untouched.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to an expense owned by the
///   scope's user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_expense(
    id: ExpenseId,
    new_expense: NewExpense,
    scope: &OwnerScope,
    connection: &Connection,
) -> Result<Expense, Error> {
    let expense = connection
        .prepare(
            "UPDATE expense
             SET amount = ?1, category = ?2, description = ?3, date = ?4
             WHERE id = ?5 AND user_id = ?6
             RETURNING id, user_id, amount, category, description, date, created_at",
        )?
        .query_row(
            (
                new_expense.amount.to_string(),
                new_expense.category,
                new_expense.description,
                new_expense.date,
                id,
                scope.owner(),
            ),
            map_expense_row,
        )?;

    Ok(expense)
}

/// Delete an expense owned by the user in `scope`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to an expense owned by the
///   scope's user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_expense(
    id: ExpenseId,
    scope: &OwnerScope,
    connection: &Connection,
) -> Result<(), Error> {
    let owner = scope.owner();
    let rows_affected = connection.execute(
        "DELETE FROM expense WHERE id = :id AND user_id = :owner",
        &[(":id", &id), (":owner", &owner)],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Create the expense table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS expense (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                amount TEXT NOT NULL,
                category TEXT NOT NULL,
                description TEXT NOT NULL,
                date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Composite index used by the listing and summary queries.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_expense_user_date ON expense(user_id, date)",
        (),
    )?;

    Ok(())
}

/// Map a database row to an [Expense].
///
/// Expects the columns in table order: id, user_id, amount, category,
/// description, date, created_at.
pub(crate) fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    let amount_text: String = row.get(2)?;
    let amount = amount_text.parse().map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(error))
    })?;

    Ok(Expense {
        id: row.get(0)?,
        user_id: row.get(1)?,
        amount,
        category: row.get(3)?,
        description: row.get(4)?,
        date: row.get(5)?,
        created_at: row.get(6)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod validation_tests {
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::expense::{Category, core::ExpenseForm};

    fn form() -> ExpenseForm {
        ExpenseForm {
            amount: dec!(12.30),
            category: "FOOD".to_owned(),
            description: "Lunch".to_owned(),
            date: date!(2025 - 08 - 01),
        }
    }

    #[test]
    fn accepts_a_well_formed_payload() {
        let new_expense = form().validate().unwrap();

        assert_eq!(new_expense.amount, dec!(12.30));
        assert_eq!(new_expense.category, Category::Food);
    }

    #[test]
    fn accepts_one_cent() {
        let result = ExpenseForm {
            amount: dec!(0.01),
            ..form()
        }
        .validate();

        assert!(result.is_ok());
    }

    #[test]
    fn pads_amount_to_two_decimal_places() {
        let new_expense = ExpenseForm {
            amount: dec!(5),
            ..form()
        }
        .validate()
        .unwrap();

        assert_eq!(new_expense.amount.to_string(), "5.00");
    }

    #[test]
    fn rejects_zero_amount() {
        let result = ExpenseForm {
            amount: dec!(0),
            ..form()
        }
        .validate();

        assert_validation_error(result, "amount");
    }

    #[test]
    fn rejects_negative_amount() {
        let result = ExpenseForm {
            amount: dec!(-3.50),
            ..form()
        }
        .validate();

        assert_validation_error(result, "amount");
    }

    #[test]
    fn rejects_three_decimal_places() {
        let result = ExpenseForm {
            amount: dec!(1.005),
            ..form()
        }
        .validate();

        assert_validation_error(result, "amount");
    }

    #[test]
    fn rejects_more_than_ten_digits() {
        let result = ExpenseForm {
            amount: dec!(123456789.00),
            ..form()
        }
        .validate();

        assert_validation_error(result, "amount");
    }

    #[test]
    fn accepts_largest_representable_amount() {
        let result = ExpenseForm {
            amount: dec!(99999999.99),
            ..form()
        }
        .validate();

        assert!(result.is_ok());
    }

    #[test]
    fn rejects_unknown_category() {
        let result = ExpenseForm {
            category: "GROCERIES".to_owned(),
            ..form()
        }
        .validate();

        assert_validation_error(result, "category");
    }

    #[test]
    fn rejects_overlong_description() {
        let result = ExpenseForm {
            description: "x".repeat(256),
            ..form()
        }
        .validate();

        assert_validation_error(result, "description");
    }

    #[test]
    fn accepts_empty_description() {
        let result = ExpenseForm {
            description: String::new(),
            ..form()
        }
        .validate();

        assert!(result.is_ok());
    }

    fn assert_validation_error(
        result: Result<super::NewExpense, crate::Error>,
        want_field: &str,
    ) {
        match result {
            Err(crate::Error::Validation { field, .. }) => assert_eq!(field, want_field),
            other => panic!("expected a validation error for {want_field}, got {other:?}"),
        }
    }
}

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::{
        Error, initialize_db,
        expense::{
            Category, OwnerScope,
            core::{
                ExpenseForm, create_expense, delete_expense, get_expense, update_expense,
            },
        },
        user::insert_user,
    };

    fn get_test_connection() -> (Connection, OwnerScope, OwnerScope) {
        let connection = Connection::open_in_memory().unwrap();
        initialize_db(&connection).unwrap();

        let alice = insert_user("alice@example.com", "Alice", "nothashed", &connection).unwrap();
        let bob = insert_user("bob@example.com", "Bob", "nothashed", &connection).unwrap();

        (
            connection,
            OwnerScope::for_user(alice.id),
            OwnerScope::for_user(bob.id),
        )
    }

    fn lunch() -> ExpenseForm {
        ExpenseForm {
            amount: dec!(12.30),
            category: "FOOD".to_owned(),
            description: "Lunch".to_owned(),
            date: date!(2025 - 08 - 01),
        }
    }

    #[test]
    fn create_stamps_owner_and_round_trips() {
        let (connection, alice, _) = get_test_connection();

        let created =
            create_expense(lunch().validate().unwrap(), &alice, &connection).unwrap();
        let selected = get_expense(created.id, &alice, &connection).unwrap();

        assert!(created.id > 0);
        assert_eq!(created.user_id, alice.owner());
        assert_eq!(created.amount, dec!(12.30));
        assert_eq!(created.category, Category::Food);
        assert_eq!(created, selected);
    }

    #[test]
    fn get_fails_for_other_owner() {
        let (connection, alice, bob) = get_test_connection();
        let created =
            create_expense(lunch().validate().unwrap(), &alice, &connection).unwrap();

        let result = get_expense(created.id, &bob, &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn get_fails_for_unknown_id() {
        let (connection, alice, _) = get_test_connection();

        let result = get_expense(1337, &alice, &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn update_replaces_fields_but_not_identity() {
        let (connection, alice, _) = get_test_connection();
        let created =
            create_expense(lunch().validate().unwrap(), &alice, &connection).unwrap();

        let replacement = ExpenseForm {
            amount: dec!(950.00),
            category: "RENT".to_owned(),
            description: String::new(),
            date: date!(2025 - 08 - 03),
        };
        let updated = update_expense(
            created.id,
            replacement.validate().unwrap(),
            &alice,
            &connection,
        )
        .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.user_id, created.user_id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.amount, dec!(950.00));
        assert_eq!(updated.category, Category::Rent);
        assert_eq!(updated.date, date!(2025 - 08 - 03));
    }

    #[test]
    fn update_fails_for_other_owner() {
        let (connection, alice, bob) = get_test_connection();
        let created =
            create_expense(lunch().validate().unwrap(), &alice, &connection).unwrap();

        let result = update_expense(
            created.id,
            lunch().validate().unwrap(),
            &bob,
            &connection,
        );

        assert_eq!(result, Err(Error::NotFound));
        // The record is untouched.
        assert_eq!(
            get_expense(created.id, &alice, &connection).unwrap(),
            created
        );
    }

    #[test]
    fn delete_removes_record() {
        let (connection, alice, _) = get_test_connection();
        let created =
            create_expense(lunch().validate().unwrap(), &alice, &connection).unwrap();

        delete_expense(created.id, &alice, &connection).unwrap();

        assert_eq!(
            get_expense(created.id, &alice, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn delete_fails_for_other_owner() {
        let (connection, alice, bob) = get_test_connection();
        let created =
            create_expense(lunch().validate().unwrap(), &alice, &connection).unwrap();

        let result = delete_expense(created.id, &bob, &connection);

        assert_eq!(result, Err(Error::NotFound));
        assert!(get_expense(created.id, &alice, &connection).is_ok());
    }

    #[test]
    fn amount_survives_storage_exactly() {
        let (connection, alice, _) = get_test_connection();
        let form = ExpenseForm {
            amount: dec!(0.10),
            ..lunch()
        };

        let created = create_expense(form.validate().unwrap(), &alice, &connection).unwrap();
        let selected = get_expense(created.id, &alice, &connection).unwrap();

        assert_eq!(selected.amount.to_string(), "0.10");
    }
}
