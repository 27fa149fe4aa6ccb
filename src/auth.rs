//! Bearer-token authentication.
//!
//! Clients exchange their credentials at the login endpoint for a pair of
//! JSON Web Tokens: a short-lived access token sent as `Authorization:
//! Bearer <token>` on every request, and a longer-lived refresh token.
//! Handlers opt into authentication by taking a [Claims] argument.

// Code in this module is adapted from https://github.com/tokio-rs/axum/blob/main/examples/jwt/src/main.rs

use axum::{
    Json, RequestPartsExt,
    extract::{FromRef, FromRequestParts, State},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use jsonwebtoken::{EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use time::{Duration, OffsetDateTime};

use crate::{AppState, Error, database_id::UserId, user::get_user_by_email};

/// How long an access token stays valid.
pub const ACCESS_TOKEN_DURATION: Duration = Duration::minutes(15);

/// How long a refresh token stays valid.
pub const REFRESH_TOKEN_DURATION: Duration = Duration::days(1);

const ACCESS_TOKEN_TYPE: &str = "access";
const REFRESH_TOKEN_TYPE: &str = "refresh";

/// The contents of a JSON Web Token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The ID of the user the token was issued to.
    pub sub: UserId,
    /// The expiry time of the token as a unix timestamp.
    pub exp: usize,
    /// The time the token was issued as a unix timestamp.
    pub iat: usize,
    /// Whether this is an access or a refresh token.
    pub token_type: String,
}

impl<S> FromRequestParts<S> for Claims
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AuthError::MissingToken)?;

        let state = AppState::from_ref(state);

        let token_data = decode::<Claims>(bearer.token(), state.decoding_key(), &Validation::default())
            .map_err(|_| AuthError::InvalidToken)?;

        // A refresh token must not grant access to the API proper.
        if token_data.claims.token_type != ACCESS_TOKEN_TYPE {
            return Err(AuthError::InvalidToken);
        }

        Ok(token_data.claims)
    }
}

/// The credentials a user logs in with.
#[derive(Deserialize)]
pub struct Credentials {
    /// Email entered during sign-in.
    pub email: String,
    /// Password entered during sign-in.
    pub password: String,
}

/// The pair of tokens handed out on a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    /// The short-lived token used to authenticate API requests.
    pub access: String,
    /// The longer-lived token used to obtain a new access token.
    pub refresh: String,
}

/// The errors that may occur while authenticating a request.
#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    /// The email or password was wrong. The client is told which no further.
    WrongCredentials,
    /// The request had no `Authorization: Bearer` header.
    MissingToken,
    /// The bearer token was malformed, expired, or not an access token.
    InvalidToken,
    /// Signing a new token failed.
    TokenCreation,
    /// An unexpected internal error, e.g. the password hash was unreadable.
    InternalError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            AuthError::WrongCredentials => (StatusCode::BAD_REQUEST, "Invalid credentials"),
            AuthError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "Authentication credentials were not provided.",
            ),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or expired token."),
            AuthError::TokenCreation | AuthError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

/// Handler for sign-in requests.
///
/// Responds with a [TokenPair] on success. Unknown emails and wrong passwords
/// produce the identical error response so that the endpoint cannot be used
/// to probe which email addresses are registered.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn sign_in(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<TokenPair>, AuthError> {
    let user = {
        let connection = state.db_connection.lock().unwrap();

        get_user_by_email(&credentials.email.to_lowercase(), &connection).map_err(
            |error| match error {
                Error::NotFound => AuthError::WrongCredentials,
                error => {
                    tracing::error!("Error matching user: {error}");
                    AuthError::InternalError
                }
            },
        )?
    };

    let password_is_correct =
        bcrypt::verify(&credentials.password, &user.password_hash).map_err(|error| {
            tracing::error!("Error verifying password: {error}");
            AuthError::InternalError
        })?;

    if !password_is_correct {
        return Err(AuthError::WrongCredentials);
    }

    let token_pair = issue_token_pair(user.id, state.encoding_key())?;

    Ok(Json(token_pair))
}

/// Sign an access and a refresh token for the user `user_id`.
pub fn issue_token_pair(
    user_id: UserId,
    encoding_key: &EncodingKey,
) -> Result<TokenPair, AuthError> {
    Ok(TokenPair {
        access: encode_jwt(user_id, ACCESS_TOKEN_TYPE, ACCESS_TOKEN_DURATION, encoding_key)?,
        refresh: encode_jwt(
            user_id,
            REFRESH_TOKEN_TYPE,
            REFRESH_TOKEN_DURATION,
            encoding_key,
        )?,
    })
}

fn encode_jwt(
    user_id: UserId,
    token_type: &str,
    duration: Duration,
    encoding_key: &EncodingKey,
) -> Result<String, AuthError> {
    let now = OffsetDateTime::now_utc();
    let claims = Claims {
        sub: user_id,
        exp: (now + duration).unix_timestamp() as usize,
        iat: now.unix_timestamp() as usize,
        token_type: token_type.to_owned(),
    };

    encode(&Header::default(), &claims, encoding_key).map_err(|error| {
        tracing::error!("Error creating JWT: {error}");
        AuthError::TokenCreation
    })
}
