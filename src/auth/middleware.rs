//! Authentication middleware that checks for a bearer token.

use axum::{
    extract::{FromRef, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use jsonwebtoken::{DecodingKey, EncodingKey};
use time::Duration;

use crate::{AppState, Error, auth::decode_jwt, user::UserID};

/// The state needed to issue and check auth tokens.
#[derive(Clone)]
pub struct AuthState {
    /// The key used to sign new tokens.
    pub encoding_key: EncodingKey,
    /// The key used to verify the signature of incoming tokens.
    pub decoding_key: DecodingKey,
    /// How long a new token is valid for.
    pub token_duration: Duration,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            encoding_key: state.encoding_key.clone(),
            decoding_key: state.decoding_key.clone(),
            token_duration: state.token_duration,
        }
    }
}

/// Get the user ID from the bearer token in `headers`, if there is a valid one.
pub fn user_id_from_headers(headers: &HeaderMap, decoding_key: &DecodingKey) -> Option<UserID> {
    let Authorization(bearer) = headers.typed_get::<Authorization<Bearer>>()?;

    decode_jwt(bearer.token(), decoding_key)
        .ok()
        .map(|claims| claims.user_id)
}

/// Middleware function that checks for a valid bearer token.
///
/// The user ID is placed into the request extensions and the request executed
/// normally if the token is valid, otherwise a 401 response is returned.
///
/// **Note**: Route handlers can use the function argument
/// `Extension(user_id): Extension<UserID>` to receive the user ID.
pub async fn auth_guard(State(state): State<AuthState>, mut request: Request, next: Next) -> Response {
    let Some(user_id) = user_id_from_headers(request.headers(), &state.decoding_key) else {
        return Error::Unauthorized.into_response();
    };

    request.extensions_mut().insert(user_id);
    next.run(request).await
}
