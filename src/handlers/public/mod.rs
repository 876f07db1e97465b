// handlers/public/mod.rs - Endpoints on excluded paths (no tenant context)

pub mod health;
pub mod root;

pub use health::health;
pub use root::root;
