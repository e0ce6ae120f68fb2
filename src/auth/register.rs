//! Registering a new user.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::IntoResponse,
};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    auth::{PasswordHash, ValidatedPassword},
    db::lock_connection,
    email::{Mailer, issue_verification},
    timezone::now_local,
    user::{NewUser, create_user, parse_email},
};

/// The state needed to register a user.
#[derive(Clone)]
pub struct RegistrationState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
    pub mailer: Arc<dyn Mailer>,
    pub verification_base_url: String,
    /// The bcrypt cost used to hash new passwords.
    pub password_cost: u32,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            mailer: state.mailer.clone(),
            verification_base_url: state.verification_base_url.clone(),
            password_cost: state.password_cost,
        }
    }
}

/// The request body for registering.
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub budget: Option<f64>,
}

/// Create a user and send them a verification email.
///
/// # Errors
///
/// Returns an error if the email is invalid or taken, or the password is too weak.
pub async fn register_endpoint(
    State(state): State<RegistrationState>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, Error> {
    let email = parse_email(&request.email)?;
    let password = ValidatedPassword::new(&request.password)?;
    let password_hash = PasswordHash::new(&password, state.password_cost)?;
    let created_at = now_local(&state.local_timezone)?;

    let connection = lock_connection(&state.db_connection)?;
    let user = create_user(
        NewUser {
            email,
            password_hash,
            name: request.name.trim().to_owned(),
            budget: request.budget.unwrap_or_default(),
            created_at,
        },
        &connection,
    )?;

    tracing::info!("registered user {}", user.id);

    if let Err(error) = issue_verification(
        &user,
        &state.verification_base_url,
        state.mailer.as_ref(),
        OffsetDateTime::now_utc(),
        &connection,
    ) {
        tracing::error!("Could not send verification email to user {}: {error}", user.id);
    }

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User created successfully" })),
    ))
}
