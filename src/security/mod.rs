//! Read-only view over the tenant context and authentication state.
//!
//! A [`SecurityView`] is a snapshot: build it with [`SecurityView::current`]
//! where the decision is made and drop it afterwards. It is never stored, since
//! the underlying context can be cleared or repopulated between calls.

use serde::Serialize;
use std::fmt;

use crate::context::{self, Authentication, Identity, Roles, TenantError};

pub const ROLE_ADMIN: &str = "ADMIN";
pub const ROLE_AGENT: &str = "AGENT";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityView {
    pub tenant_id: Option<String>,
    pub user_id: Option<String>,
    pub roles: Option<Roles>,
    pub principal: Option<String>,
    pub authenticated: bool,
}

impl SecurityView {
    /// Snapshot of the current task's tenant context.
    pub fn current() -> Self {
        Self::from_parts(context::identity(), context::authentication())
    }

    pub fn from_parts(identity: Option<Identity>, authentication: Option<Authentication>) -> Self {
        let authentication = authentication.unwrap_or_default();
        match identity {
            Some(identity) => Self {
                tenant_id: Some(identity.tenant_id),
                user_id: identity.user_id,
                roles: Some(identity.roles),
                principal: authentication.principal,
                authenticated: authentication.authenticated,
            },
            None => Self {
                principal: authentication.principal,
                authenticated: authentication.authenticated,
                ..Self::default()
            },
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.as_ref().is_some_and(|roles| roles.contains(role))
    }

    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        match &self.roles {
            Some(held) => roles.iter().any(|r| held.contains(r)),
            None => false,
        }
    }

    pub fn has_all_roles(&self, roles: &[&str]) -> bool {
        match &self.roles {
            Some(held) => roles.iter().all(|r| held.contains(r)),
            None => false,
        }
    }

    /// Tenant and user are known and the request was authenticated.
    pub fn is_valid(&self) -> bool {
        self.tenant_id.is_some() && self.user_id.is_some() && self.authenticated
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }

    pub fn is_agent(&self) -> bool {
        self.has_any_role(&[ROLE_ADMIN, ROLE_AGENT])
    }

    pub fn can_access_tenant(&self, target_tenant_id: &str) -> bool {
        self.tenant_id.as_deref() == Some(target_tenant_id)
    }

    /// Guard for routes that address a tenant explicitly.
    pub fn ensure_tenant_access(&self, target_tenant_id: &str) -> Result<(), TenantError> {
        if self.can_access_tenant(target_tenant_id) {
            Ok(())
        } else {
            tracing::warn!(
                "Tenant access denied: active tenant {:?} requested {}",
                self.tenant_id,
                target_tenant_id
            );
            Err(TenantError::access_denied(target_tenant_id))
        }
    }
}

impl fmt::Display for SecurityView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let roles = match &self.roles {
            Some(roles) => format!("[{}]", roles.iter().collect::<Vec<_>>().join(", ")),
            None => "null".to_string(),
        };
        write!(
            f,
            "TenantSecurityContext{{tenantId='{}', userId='{}', roles={}, authenticated={}}}",
            self.tenant_id.as_deref().unwrap_or("null"),
            self.user_id.as_deref().unwrap_or("null"),
            roles,
            self.authenticated
        )
    }
}
