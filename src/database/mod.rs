pub mod manager;
pub mod models;
pub mod scoped_query;

pub use manager::{DatabaseError, DatabaseManager};
pub use scoped_query::ScopedQuery;
