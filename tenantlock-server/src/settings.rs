//! Platform configuration endpoints.

use crate::error::{ApiError, ApiResult};
use crate::{blocking, AppState};
use axum::extract::{Path, State};
use axum::response::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tenantlock_tenant::ConfigEntry;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetConfigRequest {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub description: Option<String>,
}

pub(crate) async fn list(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<ConfigEntry>>> {
    let entries = blocking(move || state.config.list().map_err(ApiError::from)).await?;
    Ok(Json(entries))
}

pub(crate) async fn get(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> ApiResult<Json<ConfigEntry>> {
    let entry = blocking(move || {
        state
            .config
            .entry(&key)?
            .ok_or_else(|| tenantlock_tenant::TenantError::ConfigNotFound(key).into())
    })
    .await?;
    Ok(Json(entry))
}

pub(crate) async fn set(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetConfigRequest>,
) -> ApiResult<Json<ConfigEntry>> {
    let entry = blocking(move || {
        state
            .config
            .set(&req.key, &req.value, req.description.as_deref())
            .map_err(ApiError::from)
    })
    .await?;
    Ok(Json(entry))
}
