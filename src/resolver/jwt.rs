use axum::extract::Request;
use axum::http::header::AUTHORIZATION;

use super::header::HeaderTenantResolver;
use super::{header_text, ResolutionError, ResolvedIdentity, TenantResolver};
use crate::auth::{validate_jwt, Claims};
use crate::context::{Authentication, Identity, Roles};

const BEARER_PREFIX: &str = "Bearer ";

/// Resolves the identity from a bearer JWT, falling back to the tenant header.
///
/// Priority for the tenant id is token claim first, then header. User id and
/// roles only ever come from a verified token. A missing or invalid token does
/// not fail resolution on its own; the request is simply unauthenticated.
#[derive(Debug, Clone)]
pub struct JwtTenantResolver {
    secret: String,
    fallback: HeaderTenantResolver,
}

impl JwtTenantResolver {
    pub fn new(secret: impl Into<String>, fallback: HeaderTenantResolver) -> Self {
        Self {
            secret: secret.into(),
            fallback,
        }
    }

    fn claims(&self, request: &Request) -> Option<Claims> {
        let token = match header_text(request.headers(), AUTHORIZATION.as_str()) {
            Ok(Some(value)) => value.strip_prefix(BEARER_PREFIX)?.trim().to_string(),
            _ => return None,
        };
        if token.is_empty() {
            return None;
        }

        match validate_jwt(&token, &self.secret) {
            Ok(claims) => Some(claims),
            Err(e) => {
                tracing::debug!("Could not resolve identity from JWT: {}", e);
                None
            }
        }
    }
}

impl TenantResolver for JwtTenantResolver {
    fn resolve(&self, request: &Request) -> Result<ResolvedIdentity, ResolutionError> {
        let claims = self.claims(request);

        let token_tenant = claims
            .as_ref()
            .and_then(|c| c.tenant_id.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        let tenant_id = match token_tenant {
            Some(tenant_id) => {
                tracing::debug!("Resolved tenant ID from JWT: {}", tenant_id);
                tenant_id
            }
            None => match self.fallback.tenant_from(request)? {
                Some(tenant_id) => {
                    tracing::debug!("Resolved tenant ID from header: {}", tenant_id);
                    tenant_id
                }
                None => {
                    tracing::warn!("No tenant ID found in request");
                    return Err(ResolutionError::MissingTenant);
                }
            },
        };

        let (user_id, roles, authentication) = match claims {
            Some(claims) => {
                let roles = claims.roles();
                let user_id = Some(claims.sub).filter(|s| !s.trim().is_empty());
                (user_id, roles, Authentication::verified(claims.email))
            }
            None => (None, Roles::default(), Authentication::anonymous()),
        };

        Ok(ResolvedIdentity {
            identity: Identity::new(tenant_id, user_id, roles),
            authentication,
        })
    }
}
