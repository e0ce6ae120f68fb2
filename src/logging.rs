//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::endpoints;

/// JSON fields whose values are never logged.
const REDACTED_FIELDS: [&str; 4] = ["password", "currentPassword", "newPassword", "token"];

const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level with secrets
/// in JSON bodies redacted. If a body is longer than [LOG_BODY_LENGTH_LIMIT]
/// bytes, it is truncated and the full body is logged at the `debug` level.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match read_body(body).await {
        Some(bytes) => bytes,
        None => return StatusCode::BAD_REQUEST.into_response(),
    };
    log_body(
        &format!("Received request: {} {}", parts.method, redact_uri(&parts.uri)),
        &body_bytes,
    );

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match read_body(body).await {
        Some(bytes) => bytes,
        None => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    };
    log_body(&format!("Sending response: {}", parts.status), &body_bytes);

    Response::from_parts(parts, Body::from(body_bytes))
}

async fn read_body(body: Body) -> Option<Bytes> {
    axum::body::to_bytes(body, usize::MAX)
        .await
        .inspect_err(|error| tracing::error!("Could not read body for logging: {error}"))
        .ok()
}

fn log_body(summary: &str, body_bytes: &[u8]) {
    let body = redact_secrets(&String::from_utf8_lossy(body_bytes));

    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!("{summary}\nbody: {}...", truncate(&body, LOG_BODY_LENGTH_LIMIT));
        tracing::debug!("Full body: {body:?}");
    } else {
        tracing::info!("{summary}\nbody: {body:?}");
    }
}

/// Replace the values of [REDACTED_FIELDS] in a JSON body.
///
/// Bodies that are not JSON are returned unchanged.
fn redact_secrets(body: &str) -> String {
    let Ok(mut value) = serde_json::from_str::<Value>(body) else {
        return body.to_owned();
    };

    if !redact_value(&mut value) {
        return body.to_owned();
    }

    value.to_string()
}

/// Returns whether anything was redacted.
fn redact_value(value: &mut Value) -> bool {
    match value {
        Value::Object(map) => {
            let mut redacted = false;
            for (key, field) in map.iter_mut() {
                if REDACTED_FIELDS.contains(&key.as_str()) {
                    *field = Value::String("********".to_owned());
                    redacted = true;
                } else {
                    redacted |= redact_value(field);
                }
            }
            redacted
        }
        Value::Array(items) => items.iter_mut().fold(false, |redacted, item| {
            redact_value(item) || redacted
        }),
        _ => false,
    }
}

/// The request URI with any secret path segment, such as an email
/// verification token, replaced.
pub fn redact_uri(uri: &Uri) -> String {
    let verify_prefix = endpoints::VERIFY_EMAIL.trim_end_matches("{token}");

    match uri.path().strip_prefix(verify_prefix) {
        Some(token) if !token.is_empty() => format!("{verify_prefix}[REDACTED]"),
        _ => uri.to_string(),
    }
}

/// The longest prefix of `text` no longer than `max_len` bytes that ends on a char boundary.
fn truncate(text: &str, max_len: usize) -> &str {
    let mut end = max_len.min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }

    &text[..end]
}
