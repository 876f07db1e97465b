// handlers/protected/mod.rs - Endpoints behind the tenant interceptor
//
// Requests reach these handlers only after the tenant was resolved; anything
// the interceptor rejects has already been answered with 400.

pub mod context;
pub mod tenants;
pub mod tickets;
