// handlers/mod.rs - Route handlers by access tier
//
// Public handlers sit on excluded paths and never see a tenant context.
// Protected handlers run behind the tenant interceptor, so the context store
// and the `CurrentTenant` extractor are populated by the time they execute.

pub mod protected;
pub mod public;
