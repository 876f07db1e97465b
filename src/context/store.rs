//! Task-local storage for the identity of the request being processed.
//!
//! Every inbound request runs inside its own [`scope`], so values written by one
//! request are invisible to every other task on the runtime, including tasks that
//! later reuse the same worker thread. Outside a scope all readers return `None`.

use std::cell::RefCell;
use std::future::Future;

use tracing::{debug, error};

use super::error::TenantError;
use super::identity::{Authentication, Identity, Roles};

/// Everything the store holds for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub identity: Option<Identity>,
    pub authentication: Option<Authentication>,
}

tokio::task_local! {
    static TENANT_CONTEXT: RefCell<RequestContext>;
}

/// Run `fut` with a fresh, empty tenant context.
pub async fn scope<F>(fut: F) -> F::Output
where
    F: Future,
{
    TENANT_CONTEXT.scope(RefCell::new(RequestContext::default()), fut).await
}

/// Run `fut` with the given context already populated.
///
/// `tokio::spawn` does not inherit task-locals; pair this with [`snapshot`] to
/// carry the caller's identity into a spawned task.
pub async fn with_context<F>(context: RequestContext, fut: F) -> F::Output
where
    F: Future,
{
    TENANT_CONTEXT.scope(RefCell::new(context), fut).await
}

/// Synchronous counterpart of [`scope`] for code that is not async (batch jobs, tests).
pub fn sync_scope<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    TENANT_CONTEXT.sync_scope(RefCell::new(RequestContext::default()), f)
}

/// Copy of the current context, empty when no scope is active.
pub fn snapshot() -> RequestContext {
    TENANT_CONTEXT
        .try_with(|cell| cell.borrow().clone())
        .unwrap_or_default()
}

pub fn set_identity(identity: Identity) -> Result<(), TenantError> {
    debug!(
        "Setting tenant context: tenant={} user={:?} roles={}",
        identity.tenant_id, identity.user_id, identity.roles
    );
    TENANT_CONTEXT
        .try_with(|cell| cell.borrow_mut().identity = Some(identity))
        .map_err(|_| TenantError::OutsideScope)
}

pub fn set_identity_parts(
    tenant_id: impl Into<String>,
    user_id: Option<String>,
    roles: Roles,
) -> Result<(), TenantError> {
    set_identity(Identity::new(tenant_id, user_id, roles))
}

pub fn set_authentication(authentication: Authentication) -> Result<(), TenantError> {
    TENANT_CONTEXT
        .try_with(|cell| cell.borrow_mut().authentication = Some(authentication))
        .map_err(|_| TenantError::OutsideScope)
}

pub fn identity() -> Option<Identity> {
    TENANT_CONTEXT
        .try_with(|cell| cell.borrow().identity.clone())
        .ok()
        .flatten()
}

pub fn authentication() -> Option<Authentication> {
    TENANT_CONTEXT
        .try_with(|cell| cell.borrow().authentication.clone())
        .ok()
        .flatten()
}

pub fn tenant_id() -> Option<String> {
    TENANT_CONTEXT
        .try_with(|cell| cell.borrow().identity.as_ref().map(|i| i.tenant_id.clone()))
        .ok()
        .flatten()
}

pub fn user_id() -> Option<String> {
    TENANT_CONTEXT
        .try_with(|cell| cell.borrow().identity.as_ref().and_then(|i| i.user_id.clone()))
        .ok()
        .flatten()
}

pub fn roles() -> Option<Roles> {
    TENANT_CONTEXT
        .try_with(|cell| cell.borrow().identity.as_ref().map(|i| i.roles.clone()))
        .ok()
        .flatten()
}

pub fn is_set() -> bool {
    TENANT_CONTEXT
        .try_with(|cell| cell.borrow().identity.is_some())
        .unwrap_or(false)
}

/// Tenant id of the current request, or `ContextMissing` for tenant-agnostic callers.
pub fn require_tenant_id() -> Result<String, TenantError> {
    tenant_id().ok_or(TenantError::ContextMissing)
}

/// Reset the current context to the empty sentinel. Safe to call repeatedly.
pub fn clear() {
    let outcome = TENANT_CONTEXT.try_with(|cell| match cell.try_borrow_mut() {
        Ok(mut ctx) => {
            *ctx = RequestContext::default();
            true
        }
        Err(_) => false,
    });

    match outcome {
        Ok(true) => debug!("Tenant context cleared"),
        // The slot itself is dropped with the scope, so nothing outlives the request.
        Ok(false) => error!("Tenant context is borrowed during clear; it will be dropped with its scope"),
        Err(_) => {}
    }
}

/// Current context rendered for log lines.
pub fn describe() -> String {
    let identity = identity();
    format!(
        "TenantContext{{tenantId='{}', userId='{}', roles='{}'}}",
        identity.as_ref().map(|i| i.tenant_id.as_str()).unwrap_or("null"),
        identity.as_ref().and_then(|i| i.user_id.as_deref()).unwrap_or("null"),
        identity.as_ref().map(|i| i.roles.to_csv()).unwrap_or_else(|| "null".to_string()),
    )
}

/// Populates the store on creation and clears it exactly once when dropped.
///
/// Dropping covers normal return, panic unwinding, and cancellation of the
/// enclosing future, so the identity never outlives the handler.
#[must_use = "the tenant context is cleared as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ContextGuard {
    _private: (),
}

impl ContextGuard {
    pub fn activate(identity: Identity, authentication: Authentication) -> Result<Self, TenantError> {
        set_identity(identity)?;
        set_authentication(authentication)?;
        Ok(Self { _private: () })
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        clear();
    }
}
