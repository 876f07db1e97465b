pub mod error;
pub mod extract;
pub mod identity;
pub mod store;

pub use error::TenantError;
pub use extract::CurrentTenant;
pub use identity::{Authentication, Identity, Roles};
pub use store::{
    authentication, clear, describe, identity, is_set, require_tenant_id, roles, scope,
    set_authentication, set_identity, set_identity_parts, snapshot, sync_scope, tenant_id,
    user_id, with_context, ContextGuard, RequestContext,
};
