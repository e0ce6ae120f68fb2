//! Exchanging an email and password for an auth token.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use jsonwebtoken::EncodingKey;
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::{Value, json};
use time::{Duration, OffsetDateTime};

use crate::{
    AppState, Error,
    auth::encode_jwt,
    db::lock_connection,
    email::{Mailer, issue_verification},
    user::{get_user_by_email, parse_email},
};

/// The state needed to log in a user.
#[derive(Clone)]
pub struct LogInState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub encoding_key: EncodingKey,
    pub token_duration: Duration,
    pub mailer: Arc<dyn Mailer>,
    pub verification_base_url: String,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            encoding_key: state.encoding_key.clone(),
            token_duration: state.token_duration,
            mailer: state.mailer.clone(),
            verification_base_url: state.verification_base_url.clone(),
        }
    }
}

/// The request body for logging in.
#[derive(Deserialize)]
pub struct LogInRequest {
    pub email: String,
    pub password: String,
}

/// Check the user's credentials and respond with an auth token.
///
/// Users that have not verified their email are sent a new verification email.
///
/// # Errors
///
/// Returns [Error::InvalidCredentials] if the email is not registered or the
/// password is wrong.
pub async fn log_in_endpoint(
    State(state): State<LogInState>,
    Json(request): Json<LogInRequest>,
) -> Result<Json<Value>, Error> {
    let email = parse_email(&request.email).map_err(|_| Error::InvalidCredentials)?;
    let connection = lock_connection(&state.db_connection)?;

    let user = match get_user_by_email(email.as_str(), &connection) {
        Ok(user) => user,
        Err(Error::NotFound) => return Err(Error::InvalidCredentials),
        Err(error) => return Err(error),
    };

    if !user.password_hash.verify(&request.password)? {
        return Err(Error::InvalidCredentials);
    }

    let now = OffsetDateTime::now_utc();

    if !user.is_verified
        && let Err(error) = issue_verification(
            &user,
            &state.verification_base_url,
            state.mailer.as_ref(),
            now,
            &connection,
        )
    {
        tracing::error!("Could not resend verification email to user {}: {error}", user.id);
    }

    let token = encode_jwt(user.id, now, state.token_duration, &state.encoding_key)?;

    Ok(Json(json!({
        "message": "Login successful",
        "token": token,
        "isEmailVerified": user.is_verified,
    })))
}
