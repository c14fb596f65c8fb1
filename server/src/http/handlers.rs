use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use chrono::Utc;
use shared_types::{Config, Group};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    dto::PutConfigRequest,
    error::{ApiError, ApiResult},
    state::AppState,
};

/// PUT /config/:group
/// Create an empty group
#[instrument(skip(state))]
pub async fn put_group(
    State(state): State<Arc<AppState>>,
    Path(group): Path<String>,
) -> ApiResult<Json<Group>> {
    info!("Creating group: {}", group);

    state.adding.add_group(&group).await?;
    let created = state.listing.get_group(&group).await?;

    Ok(Json(created))
}

/// GET /config/:group
/// Get a group and the ids of its configs
#[instrument(skip(state))]
pub async fn get_group(
    State(state): State<Arc<AppState>>,
    Path(group): Path<String>,
) -> ApiResult<Json<Group>> {
    info!("Getting group: {}", group);

    Ok(Json(state.listing.get_group(&group).await?))
}

/// PUT /config/:group/:config
/// Create or replace a config in an existing group
#[instrument(skip(state, request))]
pub async fn put_config(
    State(state): State<Arc<AppState>>,
    Path((group, id)): Path<(String, String)>,
    request: Result<Json<PutConfigRequest>, JsonRejection>,
) -> ApiResult<Json<Config>> {
    info!("Putting config: {}/{}", group, id);
    let Json(request) = request.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let config = Config {
        id,
        name: request.name,
        last_modified: Utc::now(),
        version: request.version,
        group,
        properties: request.properties,
    };
    let (group, id) = (config.group.clone(), config.id.clone());

    state.adding.add_config(config).await?;
    let stored = state.listing.get_config(&group, &id).await?;

    Ok(Json(stored))
}

/// GET /config/:group/:config
#[instrument(skip(state))]
pub async fn get_config(
    State(state): State<Arc<AppState>>,
    Path((group, id)): Path<(String, String)>,
) -> ApiResult<Json<Config>> {
    info!("Getting config: {}/{}", group, id);

    Ok(Json(state.listing.get_config(&group, &id).await?))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "OK",
        "service": "ki",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
