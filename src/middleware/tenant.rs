//! Request interceptor that establishes the tenant context.
//!
//! For every non-excluded request the interceptor resolves the identity,
//! populates the task-local store, runs the rest of the stack, and clears the
//! store afterwards. Requests whose tenant cannot be resolved are answered with
//! 400 before any handler runs.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use super::exclusions::PathExclusions;
use crate::config::AppConfig;
use crate::context::{self, ContextGuard};
use crate::error::ApiError;
use crate::resolver::{self, ResolutionError, ResolvedIdentity, TenantResolver};

/// Shared state for [`tenant_context_middleware`].
#[derive(Clone)]
pub struct TenantInterceptor {
    resolver: Arc<dyn TenantResolver>,
    exclusions: PathExclusions,
}

impl TenantInterceptor {
    pub fn new(resolver: Arc<dyn TenantResolver>, exclusions: PathExclusions) -> Self {
        Self { resolver, exclusions }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            resolver::from_config(config),
            PathExclusions::new(config.tenant.excluded_paths.iter().cloned()),
        )
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclusions.is_excluded(path)
    }

    /// A panicking resolver counts as a failed resolution.
    fn resolve(&self, request: &Request) -> Result<ResolvedIdentity, ResolutionError> {
        match catch_unwind(AssertUnwindSafe(|| self.resolver.resolve(request))) {
            Ok(result) => result,
            Err(_) => {
                error!("Tenant resolver panicked for {} {}", request.method(), request.uri().path());
                Err(ResolutionError::Panicked)
            }
        }
    }
}

/// Tenant context middleware, mounted with `axum::middleware::from_fn_with_state`.
pub async fn tenant_context_middleware(
    State(interceptor): State<Arc<TenantInterceptor>>,
    request: Request,
    next: Next,
) -> Response {
    if interceptor.is_excluded(request.uri().path()) {
        return next.run(request).await;
    }

    context::scope(intercept(interceptor, request, next)).await
}

async fn intercept(interceptor: Arc<TenantInterceptor>, mut request: Request, next: Next) -> Response {
    let resolved = match interceptor.resolve(&request) {
        Ok(resolved) => resolved,
        Err(err) => return ApiError::from(err).into_response(),
    };

    let ResolvedIdentity { identity, authentication } = resolved;
    request.extensions_mut().insert(identity.clone());
    request.extensions_mut().insert(authentication.clone());

    // Dropped on return, unwind, or cancellation; each path clears the store once
    let _guard = match ContextGuard::activate(identity, authentication) {
        Ok(guard) => guard,
        Err(err) => return ApiError::from(err).into_response(),
    };
    debug!("Tenant context set: {}", context::describe());

    next.run(request).await
}
