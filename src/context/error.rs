use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TenantError {
    #[error("Tenant context is required")]
    ContextMissing,

    #[error("No tenant context scope is active on this task")]
    OutsideScope,

    #[error("Access denied for tenant: {tenant_id}")]
    AccessDenied { tenant_id: String },
}

impl TenantError {
    pub fn access_denied(tenant_id: impl Into<String>) -> Self {
        TenantError::AccessDenied { tenant_id: tenant_id.into() }
    }
}
