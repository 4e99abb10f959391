use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::AppError;
use crate::state::AppState;

/// Resolves the `{tenant_id}` path segment and verifies the tenant exists.
/// Every tenant-scoped route goes through this so that data of one tenant is
/// unreachable under another tenant's id.
pub struct TenantId(pub String);

impl FromRequestParts<Arc<AppState>> for TenantId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let params: Path<HashMap<String, String>> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::Validation("missing tenant_id path segment".into()))?;

        let tenant_id = params
            .get("tenant_id")
            .ok_or_else(|| AppError::Validation("missing tenant_id path segment".into()))?;

        state
            .tenant_repo
            .find_by_id(tenant_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tenant {} not found", tenant_id)))?;

        Ok(TenantId(tenant_id.clone()))
    }
}
