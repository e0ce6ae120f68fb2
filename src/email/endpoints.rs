//! Handlers for verifying an email address and resending the verification email.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
    http::HeaderMap,
};
use jsonwebtoken::DecodingKey;
use rusqlite::Connection;
use serde_json::{Value, json};
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    auth::user_id_from_headers,
    db::lock_connection,
    email::{Mailer, issue_verification, verify_email},
    user::{UserID, get_user_by_id},
};

/// The state needed to send and check verification emails.
#[derive(Clone)]
pub struct EmailState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub decoding_key: DecodingKey,
    pub mailer: Arc<dyn Mailer>,
    /// The address of the client app that verification links point to.
    pub verification_base_url: String,
}

impl FromRef<AppState> for EmailState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            decoding_key: state.decoding_key.clone(),
            mailer: state.mailer.clone(),
            verification_base_url: state.verification_base_url.clone(),
        }
    }
}

/// Send the logged in user a new verification email.
pub async fn resend_verification_endpoint(
    State(state): State<EmailState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Value>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let user = get_user_by_id(user_id, &connection)?;

    issue_verification(
        &user,
        &state.verification_base_url,
        state.mailer.as_ref(),
        OffsetDateTime::now_utc(),
        &connection,
    )?;

    Ok(Json(json!({ "message": "Verification email sent" })))
}

/// Verify the email of the user holding `token`.
///
/// This route does not require a log in. If the token has expired and the
/// request carries a valid bearer token, a new verification email is sent to
/// that user.
pub async fn verify_email_endpoint(
    State(state): State<EmailState>,
    headers: HeaderMap,
    Path(token): Path<String>,
) -> Result<Json<Value>, Error> {
    let now = OffsetDateTime::now_utc();
    let connection = lock_connection(&state.db_connection)?;

    match verify_email(&token, now, &connection) {
        Ok(user_id) => {
            tracing::info!("user {user_id} verified their email");
            Ok(Json(json!({ "message": "Email verified successfully" })))
        }
        Err(Error::VerificationTokenExpired { .. }) => {
            let Some(user_id) = user_id_from_headers(&headers, &state.decoding_key) else {
                return Err(Error::VerificationTokenExpired { resent: false });
            };

            let user = get_user_by_id(user_id, &connection)?;
            issue_verification(
                &user,
                &state.verification_base_url,
                state.mailer.as_ref(),
                now,
                &connection,
            )?;

            Err(Error::VerificationTokenExpired { resent: true })
        }
        Err(error) => Err(error),
    }
}
