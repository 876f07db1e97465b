use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::error::TenantError;
use super::identity::Identity;
use crate::error::ApiError;

/// Identity resolved for this request, handed to handlers explicitly.
///
/// The tenant middleware inserts the [`Identity`] into request extensions next to
/// populating the task-local store; handlers that prefer explicit parameters take
/// this extractor instead of reading the store.
#[derive(Debug, Clone)]
pub struct CurrentTenant(pub Identity);

impl CurrentTenant {
    pub fn tenant_id(&self) -> &str {
        &self.0.tenant_id
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentTenant
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(CurrentTenant)
            .ok_or_else(|| TenantError::ContextMissing.into())
    }
}
