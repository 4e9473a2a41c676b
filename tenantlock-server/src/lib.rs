//! HTTP API for tenantlock.
//!
//! Public routes serve licensed client installations (activate, validate)
//! and tenant routing (resolve). Administrative routes require
//! `Authorization: Bearer <admin token>`.

mod auth;
mod error;
mod licenses;
mod settings;
mod tenants;

use axum::middleware;
use axum::response::Json;
use axum::routing::{delete, get, post, put};
use axum::Router;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tenantlock_license::{ActivationEngine, LicenseStore};
use tenantlock_storage::{Database, TenantTable};
use tenantlock_tenant::{ConfigStore, TenantResolver};

pub use error::{ApiError, ApiResult};
pub use licenses::{
    ActivationResponse, IssueRequest, IssueResponse, MachineRequest, StatusRequest,
    ValidationResponse, DEFAULT_DAYS_VALID,
};
pub use settings::SetConfigRequest;
pub use tenants::{DeleteResponse, TenantSummary, TENANT_DOMAIN_HEADER};

/// Shared state behind every handler.
pub struct AppState {
    pub tenants: TenantTable,
    pub licenses: LicenseStore,
    pub engine: ActivationEngine,
    pub config: ConfigStore,
    pub resolver: TenantResolver,
    admin_token: String,
}

impl AppState {
    /// Wires every service to one database handle.
    pub fn new(db: Database, admin_token: impl Into<String>) -> Self {
        let tenants = TenantTable::new(db.clone());
        let directory = Arc::new(tenants.clone());
        let licenses = LicenseStore::new(db.clone());
        let config = ConfigStore::new(db);
        Self {
            engine: ActivationEngine::new(licenses.clone()),
            resolver: TenantResolver::new(directory, config.clone()),
            tenants,
            licenses,
            config,
            admin_token: admin_token.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Runs a storage call on the blocking pool.
pub(crate) async fn blocking<T, F>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
}

/// Build the HTTP API router with the given state.
pub fn build_router(state: Arc<AppState>) -> Router {
    let admin = Router::new()
        .route("/api/v1/licenses", post(licenses::issue).get(licenses::list))
        .route("/api/v1/licenses/{license_id}/status", put(licenses::set_status))
        .route(
            "/api/v1/licenses/{license_id}/reset-binding",
            post(licenses::reset_binding),
        )
        .route("/api/v1/tenants/{tenant_id}", delete(tenants::delete))
        .route("/api/v1/config", get(settings::list).put(settings::set))
        .route("/api/v1/config/{key}", get(settings::get))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_admin));

    let public = Router::new()
        .route("/api/v1/licenses/activate", post(licenses::activate))
        .route("/api/v1/licenses/validate", post(licenses::validate))
        .route("/api/v1/tenants/resolve", get(tenants::resolve))
        .route("/api/v1/health", get(health_handler));

    public.merge(admin).with_state(state)
}
