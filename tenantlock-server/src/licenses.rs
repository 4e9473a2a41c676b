//! License administration and the client activation protocol.

use crate::error::{ApiError, ApiResult};
use crate::{blocking, AppState};
use axum::extract::{Path, Query, State};
use axum::response::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tenantlock_license::{License, LicenseError, LicenseKey, LicenseStatus};
use tenantlock_types::{LicenseId, MachineHash, PlanType, TenantId};

/// Default license term when a request omits `days_valid`.
pub const DEFAULT_DAYS_VALID: i64 = 365;

fn default_days_valid() -> i64 {
    DEFAULT_DAYS_VALID
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueRequest {
    pub tenant_id: TenantId,
    #[serde(default)]
    pub plan_type: PlanType,
    #[serde(default = "default_days_valid")]
    pub days_valid: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueResponse {
    pub license_id: LicenseId,
    pub key: LicenseKey,
    pub plan_type: PlanType,
    pub valid_until: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListQuery {
    pub tenant_id: Option<TenantId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRequest {
    pub status: LicenseStatus,
}

/// Body of both activation and validation requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineRequest {
    pub key: String,
    pub machine_hash: String,
}

impl MachineRequest {
    fn parse(&self) -> Result<(LicenseKey, MachineHash), LicenseError> {
        let key = LicenseKey::parse(&self.key)?;
        let machine_hash = MachineHash::new(&self.machine_hash)?;
        Ok((key, machine_hash))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivationResponse {
    /// Always `"bound"`.
    pub status: String,
    pub license_id: LicenseId,
    pub plan_type: PlanType,
    pub valid_until: DateTime<Utc>,
    pub first_bind: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResponse {
    /// Always `"valid"`.
    pub status: String,
    pub license_id: LicenseId,
    pub plan_type: PlanType,
    pub valid_until: DateTime<Utc>,
}

pub(crate) async fn issue(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IssueRequest>,
) -> ApiResult<Json<IssueResponse>> {
    let license = blocking(move || {
        state
            .licenses
            .issue_for_days(req.tenant_id, req.plan_type, req.days_valid)
            .map_err(ApiError::from)
    })
    .await?;

    Ok(Json(IssueResponse {
        license_id: license.license_id,
        key: license.key,
        plan_type: license.plan_type,
        valid_until: license.valid_until,
    }))
}

pub(crate) async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<License>>> {
    let licenses = blocking(move || {
        let licenses = match query.tenant_id {
            Some(tenant_id) => state.licenses.list_by_tenant(&tenant_id)?,
            None => state.licenses.list_all()?,
        };
        Ok(licenses)
    })
    .await?;
    Ok(Json(licenses))
}

pub(crate) async fn set_status(
    State(state): State<Arc<AppState>>,
    Path(license_id): Path<String>,
    Json(req): Json<StatusRequest>,
) -> ApiResult<Json<License>> {
    let license_id = parse_license_id(&license_id)?;
    let license = blocking(move || {
        state
            .licenses
            .set_status(&license_id, req.status)
            .map_err(ApiError::from)
    })
    .await?;
    Ok(Json(license))
}

pub(crate) async fn reset_binding(
    State(state): State<Arc<AppState>>,
    Path(license_id): Path<String>,
) -> ApiResult<Json<License>> {
    let license_id = parse_license_id(&license_id)?;
    let license = blocking(move || {
        state
            .licenses
            .reset_binding(&license_id)
            .map_err(ApiError::from)
    })
    .await?;
    Ok(Json(license))
}

pub(crate) async fn activate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MachineRequest>,
) -> ApiResult<Json<ActivationResponse>> {
    let (key, machine_hash) = req.parse()?;
    let activation = blocking(move || {
        state
            .engine
            .activate(&key, &machine_hash)
            .map_err(ApiError::from)
    })
    .await?;

    Ok(Json(ActivationResponse {
        status: "bound".to_string(),
        license_id: activation.license.license_id,
        plan_type: activation.license.plan_type,
        valid_until: activation.license.valid_until,
        first_bind: activation.first_bind,
    }))
}

pub(crate) async fn validate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MachineRequest>,
) -> ApiResult<Json<ValidationResponse>> {
    let (key, machine_hash) = req.parse()?;
    let license = blocking(move || {
        state
            .engine
            .validate(&key, &machine_hash)
            .map_err(ApiError::from)
    })
    .await?;

    Ok(Json(ValidationResponse {
        status: "valid".to_string(),
        license_id: license.license_id,
        plan_type: license.plan_type,
        valid_until: license.valid_until,
    }))
}

fn parse_license_id(raw: &str) -> Result<LicenseId, LicenseError> {
    LicenseId::parse(raw).map_err(|e| LicenseError::InvalidInput(format!("invalid license id: {e}")))
}
