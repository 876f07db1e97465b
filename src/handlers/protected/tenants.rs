// handlers/protected/tenants.rs - GET /api/tenants/:tenant_id/access handler

use axum::extract::Path;
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult};
use crate::security::SecurityView;

/// 200 when the active tenant is the addressed tenant, 403 otherwise.
pub async fn tenant_access(Path(tenant_id): Path<String>) -> ApiResult<Value> {
    SecurityView::current().ensure_tenant_access(&tenant_id)?;
    Ok(ApiResponse::success(json!({ "tenantId": tenant_id, "access": true })))
}
