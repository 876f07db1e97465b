//! Tenant-scoped data access.
//!
//! Every operation takes the tenant id it runs under, so a query that forgets to
//! filter by tenant cannot be written against this contract. An id that exists
//! under another tenant behaves exactly like an id that does not exist.

pub mod error;
pub mod memory;
pub mod postgres;

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::context;

pub use error::RepositoryError;
pub use memory::InMemoryRepository;
pub use postgres::PgRepository;

/// A stored record that belongs to exactly one tenant.
pub trait TenantScoped: Clone + Send + Sync + 'static {
    /// Backing table for SQL implementations.
    const TABLE: &'static str;

    fn id(&self) -> Uuid;
    fn tenant_id(&self) -> &str;
    fn set_tenant_id(&mut self, tenant_id: String);
    fn created_at(&self) -> DateTime<Utc>;
}

/// Zero-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub size: u32,
}

fn default_page_size() -> u32 {
    20
}

/// Largest page a repository serves unless configured otherwise.
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 1000;

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    /// Same page with `size` forced into `1..=max_size`.
    pub fn bounded(self, max_size: u32) -> Self {
        Self {
            page: self.page,
            size: self.size.clamp(1, max_size.max(1)),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, default_page_size())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total_elements: u64) -> Self {
        let size = u64::from(request.size.max(1));
        let total_pages = total_elements.div_ceil(size);
        Self {
            items,
            page: request.page,
            size: request.size,
            total_elements,
            total_pages: u32::try_from(total_pages).unwrap_or(u32::MAX),
        }
    }
}

/// Operation set every tenant-scoped aggregate root supports.
///
/// Listing is ordered by creation time, then id, so pages are reproducible.
#[async_trait]
pub trait TenantScopedRepository<T: TenantScoped>: Send + Sync {
    async fn find_by_id(&self, id: Uuid, tenant_id: &str) -> Result<Option<T>, RepositoryError>;

    async fn find_all(&self, tenant_id: &str) -> Result<Vec<T>, RepositoryError>;

    /// The requested size is clamped to `1..=max_page_size`; the returned page
    /// reports the size actually used.
    async fn find_page(&self, tenant_id: &str, page: PageRequest) -> Result<Page<T>, RepositoryError>;

    async fn count(&self, tenant_id: &str) -> Result<u64, RepositoryError>;

    async fn exists_by_id(&self, id: Uuid, tenant_id: &str) -> Result<bool, RepositoryError>;

    /// Deletes only when both id and tenant match; anything else is a no-op.
    async fn delete_by_id(&self, id: Uuid, tenant_id: &str) -> Result<(), RepositoryError>;

    /// Stamps `tenant_id` onto the entity and stores it. Updating an id owned by
    /// another tenant fails with [`RepositoryError::NotFound`].
    async fn save(&self, entity: T, tenant_id: &str) -> Result<T, RepositoryError>;

    async fn get_by_id(&self, id: Uuid, tenant_id: &str) -> Result<T, RepositoryError> {
        self.find_by_id(id, tenant_id).await?.ok_or(RepositoryError::NotFound)
    }
}

/// Repository bound to the tenant of the current request.
///
/// Each call reads the tenant id from the context store and fails with
/// `ContextMissing` when none is set.
pub struct ScopedRepository<T: TenantScoped> {
    inner: Arc<dyn TenantScopedRepository<T>>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: TenantScoped> Clone for ScopedRepository<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: TenantScoped> ScopedRepository<T> {
    pub fn new(inner: Arc<dyn TenantScopedRepository<T>>) -> Self {
        Self {
            inner,
            _entity: PhantomData,
        }
    }

    fn tenant() -> Result<String, RepositoryError> {
        Ok(context::require_tenant_id()?)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, RepositoryError> {
        self.inner.find_by_id(id, &Self::tenant()?).await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<T, RepositoryError> {
        self.inner.get_by_id(id, &Self::tenant()?).await
    }

    pub async fn find_all(&self) -> Result<Vec<T>, RepositoryError> {
        self.inner.find_all(&Self::tenant()?).await
    }

    pub async fn find_page(&self, page: PageRequest) -> Result<Page<T>, RepositoryError> {
        self.inner.find_page(&Self::tenant()?, page).await
    }

    pub async fn count(&self) -> Result<u64, RepositoryError> {
        self.inner.count(&Self::tenant()?).await
    }

    pub async fn exists_by_id(&self, id: Uuid) -> Result<bool, RepositoryError> {
        self.inner.exists_by_id(id, &Self::tenant()?).await
    }

    pub async fn delete_by_id(&self, id: Uuid) -> Result<(), RepositoryError> {
        self.inner.delete_by_id(id, &Self::tenant()?).await
    }

    pub async fn save(&self, entity: T) -> Result<T, RepositoryError> {
        self.inner.save(entity, &Self::tenant()?).await
    }
}

/// Record a blocked cross-tenant attempt. The owning tenant is never logged.
pub(crate) fn audit_cross_tenant(operation: &str, table: &str, id: Uuid, tenant_id: &str) {
    tracing::warn!(
        target: "tenant_audit",
        operation,
        table,
        %id,
        tenant_id,
        "Blocked cross-tenant access attempt"
    );
}
