use thiserror::Error;

use crate::context::TenantError;

#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Unknown id, or an id owned by another tenant; the two are never distinguished
    #[error("Record not found")]
    NotFound,

    #[error(transparent)]
    Tenant(#[from] TenantError),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
