// handlers/protected/context.rs - GET /api/context/whoami handler

use serde::Serialize;

use crate::middleware::{ApiResponse, ApiResult};
use crate::security::SecurityView;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhoAmI {
    #[serde(flatten)]
    pub view: SecurityView,
    pub is_valid: bool,
    pub is_admin: bool,
    pub is_agent: bool,
}

impl From<SecurityView> for WhoAmI {
    fn from(view: SecurityView) -> Self {
        Self {
            is_valid: view.is_valid(),
            is_admin: view.is_admin(),
            is_agent: view.is_agent(),
            view,
        }
    }
}

/// Security view of the caller, read from the tenant context store.
pub async fn whoami() -> ApiResult<WhoAmI> {
    let view = SecurityView::current();
    tracing::debug!("whoami: {}", view);
    Ok(ApiResponse::success(view.into()))
}
