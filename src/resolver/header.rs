use axum::extract::Request;

use super::{header_text, ResolutionError, ResolvedIdentity, TenantResolver};
use crate::context::{Authentication, Identity, Roles};

/// Reads the identity from plain headers, as forwarded by the gateway.
///
/// Header-only identities are never considered authenticated.
#[derive(Debug, Clone)]
pub struct HeaderTenantResolver {
    tenant_header: String,
    user_header: String,
    roles_header: String,
}

impl HeaderTenantResolver {
    pub fn new(tenant_header: impl Into<String>, user_header: impl Into<String>, roles_header: impl Into<String>) -> Self {
        Self {
            tenant_header: tenant_header.into(),
            user_header: user_header.into(),
            roles_header: roles_header.into(),
        }
    }

    pub(crate) fn tenant_from(&self, request: &Request) -> Result<Option<String>, ResolutionError> {
        header_text(request.headers(), &self.tenant_header)
    }
}

impl Default for HeaderTenantResolver {
    fn default() -> Self {
        Self::new("X-Tenant-ID", "X-User-ID", "X-User-Roles")
    }
}

impl TenantResolver for HeaderTenantResolver {
    fn resolve(&self, request: &Request) -> Result<ResolvedIdentity, ResolutionError> {
        let headers = request.headers();
        let tenant_id = header_text(headers, &self.tenant_header)?.ok_or_else(|| {
            tracing::warn!("No tenant ID found in request");
            ResolutionError::MissingTenant
        })?;
        let user_id = header_text(headers, &self.user_header)?;
        let roles = header_text(headers, &self.roles_header)?
            .map(|csv| Roles::parse_csv(&csv))
            .unwrap_or_default();

        tracing::debug!("Resolved tenant ID from header: {}", tenant_id);

        Ok(ResolvedIdentity {
            identity: Identity::new(tenant_id, user_id, roles),
            authentication: Authentication::anonymous(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request(headers: &[(&str, &str)]) -> Request {
        let mut builder = Request::builder().uri("/api/tickets");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn resolves_full_triple() {
        let resolved = HeaderTenantResolver::default()
            .resolve(&request(&[
                ("X-Tenant-ID", "acme"),
                ("X-User-ID", "u1"),
                ("X-User-Roles", "ADMIN,AGENT"),
            ]))
            .unwrap();

        assert_eq!(resolved.identity.tenant_id, "acme");
        assert_eq!(resolved.identity.user_id.as_deref(), Some("u1"));
        assert_eq!(resolved.identity.roles.to_csv(), "ADMIN,AGENT");
        assert_eq!(resolved.authentication, Authentication::anonymous());
    }

    #[test]
    fn tenant_alone_is_enough() {
        let resolved = HeaderTenantResolver::default()
            .resolve(&request(&[("X-Tenant-ID", "acme")]))
            .unwrap();
        assert_eq!(resolved.identity, Identity::tenant_only("acme"));
    }

    #[test]
    fn missing_or_blank_tenant_fails() {
        let resolver = HeaderTenantResolver::default();
        assert_eq!(resolver.resolve(&request(&[("X-User-ID", "u1")])), Err(ResolutionError::MissingTenant));
        assert_eq!(resolver.resolve(&request(&[("X-Tenant-ID", " ")])), Err(ResolutionError::MissingTenant));
    }

    #[test]
    fn custom_header_names() {
        let resolver = HeaderTenantResolver::new("X-Org", "X-Member", "X-Grants");
        let resolved = resolver
            .resolve(&request(&[("X-Org", "initech"), ("X-Grants", "AGENT")]))
            .unwrap();
        assert_eq!(resolved.identity.tenant_id, "initech");
        assert!(resolved.identity.roles.contains("AGENT"));
    }
}
