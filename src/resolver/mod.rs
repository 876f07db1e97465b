//! Turns an inbound request into the identity the tenant context is built from.

pub mod header;
pub mod jwt;

use std::sync::Arc;

use axum::extract::Request;
use axum::http::HeaderMap;
use thiserror::Error;

use crate::config::{AppConfig, ResolverKind};
use crate::context::{Authentication, Identity};

pub use header::HeaderTenantResolver;
pub use jwt::JwtTenantResolver;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("Tenant ID not found in request")]
    MissingTenant,

    #[error("Header '{0}' is not valid text")]
    InvalidHeader(String),

    #[error("Tenant resolver failed unexpectedly")]
    Panicked,
}

/// What a resolver extracted from one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub identity: Identity,
    pub authentication: Authentication,
}

/// Extracts the tenant identity carried by a request.
///
/// Implementations must be synchronous and side-effect free; failing to find a
/// tenant is reported as [`ResolutionError::MissingTenant`].
pub trait TenantResolver: Send + Sync {
    fn resolve(&self, request: &Request) -> Result<ResolvedIdentity, ResolutionError>;
}

/// Build the resolver selected by configuration.
pub fn from_config(config: &AppConfig) -> Arc<dyn TenantResolver> {
    let headers = HeaderTenantResolver::new(
        config.tenant.tenant_header.clone(),
        config.tenant.user_header.clone(),
        config.tenant.roles_header.clone(),
    );
    match config.tenant.resolver {
        ResolverKind::Header => Arc::new(headers),
        ResolverKind::Jwt => Arc::new(JwtTenantResolver::new(config.security.jwt_secret.clone(), headers)),
    }
}

/// Trimmed, non-blank header value.
pub(crate) fn header_text(headers: &HeaderMap, name: &str) -> Result<Option<String>, ResolutionError> {
    let Some(value) = headers.get(name) else {
        return Ok(None);
    };
    let text = value
        .to_str()
        .map_err(|_| ResolutionError::InvalidHeader(name.to_string()))?
        .trim();
    if text.is_empty() {
        Ok(None)
    } else {
        Ok(Some(text.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn header_text_trims_and_skips_blank_values() {
        let mut headers = HeaderMap::new();
        headers.insert("x-tenant-id", HeaderValue::from_static("  acme "));
        headers.insert("x-user-id", HeaderValue::from_static("   "));

        assert_eq!(header_text(&headers, "X-Tenant-ID").unwrap().as_deref(), Some("acme"));
        assert_eq!(header_text(&headers, "X-User-ID").unwrap(), None);
        assert_eq!(header_text(&headers, "X-Missing").unwrap(), None);
    }

    #[test]
    fn non_text_header_is_an_error() {
        let mut headers = HeaderMap::new();
        headers.insert("x-tenant-id", HeaderValue::from_bytes(&[0xff, 0xfe]).unwrap());
        assert_eq!(
            header_text(&headers, "X-Tenant-ID"),
            Err(ResolutionError::InvalidHeader("X-Tenant-ID".to_string()))
        );
    }

    #[test]
    fn config_selects_resolver_kind() {
        let mut config = AppConfig::development();
        config.tenant.resolver = ResolverKind::Header;
        let resolver = from_config(&config);

        let request = Request::builder()
            .header("X-Tenant-ID", "acme")
            .body(axum::body::Body::empty())
            .unwrap();
        let resolved = resolver.resolve(&request).unwrap();
        assert_eq!(resolved.identity.tenant_id, "acme");
        assert!(!resolved.authentication.authenticated);
    }
}
