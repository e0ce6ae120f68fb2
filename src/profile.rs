//! Viewing and editing the logged in user's profile.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use time::PrimitiveDateTime;

use crate::{
    AppState, Error,
    auth::{PasswordHash, ValidatedPassword},
    db::lock_connection,
    ledger_date::wall_clock,
    user::{UserID, get_user_by_id, update_password, update_profile},
};

/// The state needed by the profile endpoints.
#[derive(Debug, Clone)]
pub struct ProfileState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The bcrypt cost used to hash new passwords.
    pub password_cost: u32,
}

impl FromRef<AppState> for ProfileState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            password_cost: state.password_cost,
        }
    }
}

/// The public parts of a user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    pub email: String,
    pub budget: f64,
    #[serde(with = "wall_clock")]
    pub created_at: PrimitiveDateTime,
    pub is_verified: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: String,
    pub budget: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

pub async fn get_profile_endpoint(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Profile>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let user = get_user_by_id(user_id, &connection)?;

    Ok(Json(Profile {
        name: user.name,
        email: user.email,
        budget: user.budget,
        created_at: user.created_at,
        is_verified: user.is_verified,
    }))
}

pub async fn update_profile_endpoint(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserID>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<Value>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    update_profile(user_id, request.name.trim(), request.budget, &connection)?;

    Ok(Json(json!({ "message": "Profile updated successfully" })))
}

/// Replace the user's password after checking their current one.
///
/// # Errors
///
/// Returns [Error::IncorrectPassword] if `current_password` is wrong, or
/// [Error::TooWeak] if the new password is too easy to guess.
pub async fn change_password_endpoint(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserID>,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<Value>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let user = get_user_by_id(user_id, &connection)?;

    if !user.password_hash.verify(&request.current_password)? {
        return Err(Error::IncorrectPassword);
    }

    let new_password = ValidatedPassword::new(&request.new_password)?;
    let password_hash = PasswordHash::new(&new_password, state.password_cost)?;
    update_password(user_id, &password_hash, &connection)?;

    Ok(Json(json!({ "message": "Password updated successfully" })))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Json, extract::State};
    use rusqlite::Connection;

    use crate::{
        Error,
        auth::PasswordHash,
        db::initialize,
        test_utils::{TEST_PASSWORD, create_test_user},
        user::get_user_by_id,
    };

    use super::{
        ChangePasswordRequest, ProfileState, UpdateProfileRequest, change_password_endpoint,
        get_profile_endpoint, update_profile_endpoint,
    };

    fn get_state() -> ProfileState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        ProfileState {
            db_connection: Arc::new(Mutex::new(connection)),
            password_cost: 4,
        }
    }

    #[tokio::test]
    async fn update_then_get_profile() {
        let state = get_state();
        let user = create_test_user(&state.db_connection.lock().unwrap(), "a@example.com");

        update_profile_endpoint(
            State(state.clone()),
            Extension(user.id),
            Json(UpdateProfileRequest {
                name: " Ada ".to_owned(),
                budget: 1500.0,
            }),
        )
        .await
        .unwrap();

        let Json(profile) = get_profile_endpoint(State(state), Extension(user.id))
            .await
            .unwrap();
        assert_eq!(profile.name, "Ada");
        assert_eq!(profile.budget, 1500.0);
        assert_eq!(profile.email, "a@example.com");
        assert!(!profile.is_verified);
    }

    #[tokio::test]
    async fn change_password_requires_current_password() {
        let state = get_state();
        let user = create_test_user(&state.db_connection.lock().unwrap(), "a@example.com");

        let result = change_password_endpoint(
            State(state),
            Extension(user.id),
            Json(ChangePasswordRequest {
                current_password: "wrong password".to_owned(),
                new_password: "averystrongandsecurenewpassword".to_owned(),
            }),
        )
        .await;

        assert!(matches!(result, Err(Error::IncorrectPassword)));
    }

    #[tokio::test]
    async fn change_password_replaces_hash() {
        let state = get_state();
        let user = create_test_user(&state.db_connection.lock().unwrap(), "a@example.com");
        let new_password = "averystrongandsecurenewpassword";

        change_password_endpoint(
            State(state.clone()),
            Extension(user.id),
            Json(ChangePasswordRequest {
                current_password: TEST_PASSWORD.to_owned(),
                new_password: new_password.to_owned(),
            }),
        )
        .await
        .unwrap();

        let stored: PasswordHash = get_user_by_id(user.id, &state.db_connection.lock().unwrap())
            .unwrap()
            .password_hash;
        assert!(stored.verify(new_password).unwrap());
        assert!(!stored.verify(TEST_PASSWORD).unwrap());
    }

    #[tokio::test]
    async fn change_password_rejects_weak_password() {
        let state = get_state();
        let user = create_test_user(&state.db_connection.lock().unwrap(), "a@example.com");

        let result = change_password_endpoint(
            State(state),
            Extension(user.id),
            Json(ChangePasswordRequest {
                current_password: TEST_PASSWORD.to_owned(),
                new_password: "password".to_owned(),
            }),
        )
        .await;

        assert!(matches!(result, Err(Error::TooWeak(_))));
    }
}
