//! Tenant lookup by host and tenant removal.

use crate::error::{ApiError, ApiResult};
use crate::{blocking, AppState};
use axum::extract::{Path, Query, State};
use axum::http::header::HOST;
use axum::http::HeaderMap;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tenantlock_tenant::TenantError;
use tenantlock_types::{Tenant, TenantId, TenantStatus};
use tracing::info;

/// Header a fronting proxy uses to pass the original request domain.
pub const TENANT_DOMAIN_HEADER: &str = "x-tenant-domain";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveQuery {
    pub host: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantSummary {
    pub tenant_id: TenantId,
    pub name: String,
    pub status: TenantStatus,
    pub subdomain: Option<String>,
    pub custom_domain: Option<String>,
}

impl From<Tenant> for TenantSummary {
    fn from(tenant: Tenant) -> Self {
        Self {
            tenant_id: tenant.tenant_id,
            name: tenant.name,
            status: tenant.status,
            subdomain: tenant.subdomain,
            custom_domain: tenant.custom_domain,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub tenant_id: TenantId,
    pub revoked_licenses: usize,
}

/// Resolves the tenant for `?host=`, else `X-Tenant-Domain`, else `Host`.
/// Blocked tenants are refused.
pub(crate) async fn resolve(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ResolveQuery>,
    headers: HeaderMap,
) -> ApiResult<Json<TenantSummary>> {
    let host = query
        .host
        .or_else(|| header_value(&headers, TENANT_DOMAIN_HEADER))
        .or_else(|| header_value(&headers, HOST.as_str()))
        .unwrap_or_default();

    let tenant = blocking(move || state.resolver.resolve_active(&host).map_err(ApiError::from)).await?;
    Ok(Json(tenant.into()))
}

/// Revokes every license of the tenant and removes the tenant row, in one
/// transaction.
pub(crate) async fn delete(
    State(state): State<Arc<AppState>>,
    Path(tenant_id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let tenant_id = TenantId::parse(&tenant_id)
        .map_err(|e| TenantError::InvalidInput(format!("invalid tenant id: {e}")))?;

    let revoked =
        blocking(move || state.licenses.remove_tenant(&tenant_id).map_err(ApiError::from)).await?;

    info!("Tenant {} removed, {} licenses revoked", tenant_id, revoked);
    Ok(Json(DeleteResponse {
        tenant_id,
        revoked_licenses: revoked,
    }))
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}
