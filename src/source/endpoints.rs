//! HTTP handlers for listing, creating, renaming and deleting sources.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState, Error,
    db::lock_connection,
    source::{
        Source, SourceId, SourceName, create_source, delete_source, get_source, get_sources,
        update_source,
    },
    timezone::now_local,
    user::UserID,
};

/// The state needed by the source endpoints.
#[derive(Debug, Clone)]
pub struct SourceState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for SourceState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The request body for creating or renaming a source.
#[derive(Debug, Deserialize)]
pub struct SourceRequest {
    pub source: String,
}

pub async fn get_sources_endpoint(
    State(state): State<SourceState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<Source>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_sources(user_id, &connection).map(Json)
}

pub async fn get_source_endpoint(
    State(state): State<SourceState>,
    Extension(user_id): Extension<UserID>,
    Path(source_id): Path<SourceId>,
) -> Result<Json<Source>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_source(user_id, source_id, &connection).map(Json)
}

pub async fn create_source_endpoint(
    State(state): State<SourceState>,
    Extension(user_id): Extension<UserID>,
    Json(request): Json<SourceRequest>,
) -> Result<impl IntoResponse, Error> {
    let name = SourceName::new(&request.source)?;
    let now = now_local(&state.local_timezone)?;
    let connection = lock_connection(&state.db_connection)?;

    let source = create_source(user_id, &name, now, &connection)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Source created successfully", "source": source })),
    ))
}

pub async fn update_source_endpoint(
    State(state): State<SourceState>,
    Extension(user_id): Extension<UserID>,
    Path(source_id): Path<SourceId>,
    Json(request): Json<SourceRequest>,
) -> Result<impl IntoResponse, Error> {
    let name = SourceName::new(&request.source)?;
    let connection = lock_connection(&state.db_connection)?;

    update_source(user_id, source_id, &name, &connection)?;

    Ok(Json(json!({ "message": "Source updated successfully" })))
}

pub async fn delete_source_endpoint(
    State(state): State<SourceState>,
    Extension(user_id): Extension<UserID>,
    Path(source_id): Path<SourceId>,
) -> Result<impl IntoResponse, Error> {
    let now = now_local(&state.local_timezone)?;
    let connection = lock_connection(&state.db_connection)?;

    delete_source(user_id, source_id, now, &connection)?;

    Ok(Json(json!({ "message": "Source deleted successfully" })))
}
