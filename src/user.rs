//! User accounts: the registration endpoint and the user table.

use std::str::FromStr;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use email_address::EmailAddress;
use rusqlite::{Connection, Row};
use serde::Deserialize;
use serde_json::json;

use crate::{AppState, Error, database_id::UserId};

/// Somebody who can log in and record expenses.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The ID of the user.
    pub id: UserId,
    /// The user's email address, stored lowercased.
    pub email: String,
    /// The user's display name. May be empty.
    pub name: String,
    /// The bcrypt hash of the user's password.
    pub password_hash: String,
}

/// The request body for the registration endpoint.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    /// The email address to register. Must be unique across all users.
    pub email: String,
    /// An optional display name.
    #[serde(default)]
    pub name: String,
    /// The plain-text password. Only its bcrypt hash is stored.
    pub password: String,
}

const MIN_PASSWORD_LENGTH: usize = 8;

impl RegisterForm {
    fn validate(&self) -> Result<(), Error> {
        if EmailAddress::from_str(&self.email).is_err() {
            return Err(Error::Validation {
                field: "email",
                message: "Enter a valid email address.".to_owned(),
            });
        }

        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(Error::Validation {
                field: "password",
                message: format!(
                    "This password is too short. It must contain at least {MIN_PASSWORD_LENGTH} characters."
                ),
            });
        }

        Ok(())
    }
}

/// A route handler for registering a new user account.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn register_endpoint(
    State(state): State<AppState>,
    Json(form): Json<RegisterForm>,
) -> Result<impl IntoResponse, Error> {
    form.validate()?;

    let password_hash = hash_password(&form.password)?;

    let connection = state.db_connection.lock().unwrap();
    insert_user(&form.email.to_lowercase(), &form.name, &password_hash, &connection)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User created" })),
    ))
}

/// Hash a plain-text password with bcrypt.
///
/// # Errors
/// Returns [Error::HashingError] if the underlying library fails.
pub fn hash_password(password: &str) -> Result<String, Error> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|error| Error::HashingError(error.to_string()))
}

/// Create a new user in the database.
///
/// `email` is expected to already be lowercased and `password_hash` to be a
/// bcrypt hash, see [hash_password].
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicateEmail] if a user with `email` already exists,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn insert_user(
    email: &str,
    name: &str,
    password_hash: &str,
    connection: &Connection,
) -> Result<User, Error> {
    let user = connection
        .prepare(
            "INSERT INTO user (email, name, password_hash)
             VALUES (?1, ?2, ?3)
             RETURNING id, email, name, password_hash",
        )?
        .query_row((email, name, password_hash), map_user_row)?;

    Ok(user)
}

/// Retrieve a user from the database by their email address.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if no user has the email `email`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_user_by_email(email: &str, connection: &Connection) -> Result<User, Error> {
    let user = connection
        .prepare("SELECT id, email, name, password_hash FROM user WHERE email = :email")?
        .query_one(&[(":email", &email)], map_user_row)?;

    Ok(user)
}

/// Create the user table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT UNIQUE NOT NULL,
                name TEXT NOT NULL,
                password_hash TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        password_hash: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::{
        Error, initialize_db,
        user::{get_user_by_email, insert_user},
    };

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize_db(&connection).unwrap();
        connection
    }

    #[test]
    fn insert_and_select_user() {
        let connection = get_test_connection();

        let inserted = insert_user("foo@bar.baz", "Foo", "nothashed", &connection).unwrap();
        let selected = get_user_by_email("foo@bar.baz", &connection).unwrap();

        assert!(inserted.id > 0);
        assert_eq!(inserted, selected);
    }

    #[test]
    fn insert_fails_on_duplicate_email() {
        let connection = get_test_connection();
        insert_user("foo@bar.baz", "Foo", "nothashed", &connection).unwrap();

        let duplicate = insert_user("foo@bar.baz", "Other", "alsonothashed", &connection);

        assert_eq!(duplicate, Err(Error::DuplicateEmail));
    }

    #[test]
    fn select_fails_on_unknown_email() {
        let connection = get_test_connection();

        let result = get_user_by_email("nobody@example.com", &connection);

        assert_eq!(result, Err(Error::NotFound));
    }
}
