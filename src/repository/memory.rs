use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    audit_cross_tenant, Page, PageRequest, RepositoryError, TenantScoped, TenantScopedRepository,
    DEFAULT_MAX_PAGE_SIZE,
};

/// Process-local store keyed by id; every read filters on tenant.
pub struct InMemoryRepository<T> {
    records: RwLock<HashMap<Uuid, T>>,
    audit: bool,
    max_page_size: u32,
}

impl<T: TenantScoped> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            audit: false,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }

    /// Log blocked cross-tenant lookups, deletes and saves.
    pub fn with_audit(mut self, audit: bool) -> Self {
        self.audit = audit;
        self
    }

    pub fn with_max_page_size(mut self, max_page_size: u32) -> Self {
        self.max_page_size = max_page_size;
        self
    }

    fn audit(&self, operation: &str, id: Uuid, tenant_id: &str) {
        if self.audit {
            audit_cross_tenant(operation, T::TABLE, id, tenant_id);
        }
    }

    async fn sorted_for(&self, tenant_id: &str) -> Vec<T> {
        let records = self.records.read().await;
        let mut out: Vec<T> = records
            .values()
            .filter(|r| r.tenant_id() == tenant_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.created_at().cmp(&b.created_at()).then_with(|| a.id().cmp(&b.id())));
        out
    }
}

impl<T: TenantScoped> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: TenantScoped> TenantScopedRepository<T> for InMemoryRepository<T> {
    async fn find_by_id(&self, id: Uuid, tenant_id: &str) -> Result<Option<T>, RepositoryError> {
        let records = self.records.read().await;
        match records.get(&id) {
            Some(record) if record.tenant_id() == tenant_id => Ok(Some(record.clone())),
            Some(_) => {
                self.audit("find", id, tenant_id);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn find_all(&self, tenant_id: &str) -> Result<Vec<T>, RepositoryError> {
        Ok(self.sorted_for(tenant_id).await)
    }

    async fn find_page(&self, tenant_id: &str, page: PageRequest) -> Result<Page<T>, RepositoryError> {
        let page = page.bounded(self.max_page_size);
        let all = self.sorted_for(tenant_id).await;
        let total = all.len() as u64;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let items = all.into_iter().skip(offset).take(page.size as usize).collect();
        Ok(Page::new(items, page, total))
    }

    async fn count(&self, tenant_id: &str) -> Result<u64, RepositoryError> {
        let records = self.records.read().await;
        Ok(records.values().filter(|r| r.tenant_id() == tenant_id).count() as u64)
    }

    async fn exists_by_id(&self, id: Uuid, tenant_id: &str) -> Result<bool, RepositoryError> {
        Ok(self.find_by_id(id, tenant_id).await?.is_some())
    }

    async fn delete_by_id(&self, id: Uuid, tenant_id: &str) -> Result<(), RepositoryError> {
        let mut records = self.records.write().await;
        match records.get(&id).map(|r| r.tenant_id() == tenant_id) {
            Some(true) => {
                records.remove(&id);
            }
            Some(false) => self.audit("delete", id, tenant_id),
            None => {}
        }
        Ok(())
    }

    async fn save(&self, mut entity: T, tenant_id: &str) -> Result<T, RepositoryError> {
        entity.set_tenant_id(tenant_id.to_string());
        let id = entity.id();

        let mut records = self.records.write().await;
        if let Some(existing) = records.get(&id) {
            if existing.tenant_id() != tenant_id {
                self.audit("save", id, tenant_id);
                return Err(RepositoryError::NotFound);
            }
        }
        records.insert(id, entity.clone());
        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};

    #[derive(Debug, Clone, PartialEq)]
    struct Note {
        id: Uuid,
        tenant_id: String,
        body: String,
        created_at: DateTime<Utc>,
    }

    impl TenantScoped for Note {
        const TABLE: &'static str = "notes";

        fn id(&self) -> Uuid {
            self.id
        }

        fn tenant_id(&self) -> &str {
            &self.tenant_id
        }

        fn set_tenant_id(&mut self, tenant_id: String) {
            self.tenant_id = tenant_id;
        }

        fn created_at(&self) -> DateTime<Utc> {
            self.created_at
        }
    }

    fn note(body: &str, minutes: i64) -> Note {
        Note {
            id: Uuid::new_v4(),
            tenant_id: String::new(),
            body: body.to_string(),
            created_at: Utc::now() + Duration::minutes(minutes),
        }
    }

    #[tokio::test]
    async fn save_stamps_tenant() {
        let repo = InMemoryRepository::new();
        let mut draft = note("hello", 0);
        draft.tenant_id = "spoofed".to_string();

        let saved = repo.save(draft, "acme").await.unwrap();
        assert_eq!(saved.tenant_id, "acme");
        assert_eq!(repo.count("acme").await.unwrap(), 1);
        assert_eq!(repo.count("spoofed").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn foreign_id_looks_missing() {
        let repo = InMemoryRepository::new().with_audit(true);
        let saved = repo.save(note("secret", 0), "acme").await.unwrap();

        assert_eq!(repo.find_by_id(saved.id, "globex").await.unwrap(), None);
        assert!(!repo.exists_by_id(saved.id, "globex").await.unwrap());
        assert!(matches!(repo.get_by_id(saved.id, "globex").await, Err(RepositoryError::NotFound)));
        assert!(matches!(repo.get_by_id(Uuid::new_v4(), "globex").await, Err(RepositoryError::NotFound)));
        assert_eq!(repo.find_by_id(saved.id, "acme").await.unwrap(), Some(saved));
    }

    #[tokio::test]
    async fn foreign_delete_is_a_no_op() {
        let repo = InMemoryRepository::new();
        let saved = repo.save(note("keep me", 0), "acme").await.unwrap();

        repo.delete_by_id(saved.id, "globex").await.unwrap();
        assert!(repo.exists_by_id(saved.id, "acme").await.unwrap());

        repo.delete_by_id(saved.id, "acme").await.unwrap();
        repo.delete_by_id(saved.id, "acme").await.unwrap();
        assert!(!repo.exists_by_id(saved.id, "acme").await.unwrap());
    }

    #[tokio::test]
    async fn foreign_save_cannot_overwrite() {
        let repo = InMemoryRepository::new();
        let saved = repo.save(note("original", 0), "acme").await.unwrap();

        let mut hijack = saved.clone();
        hijack.body = "hijacked".to_string();
        assert!(matches!(repo.save(hijack, "globex").await, Err(RepositoryError::NotFound)));
        assert_eq!(repo.get_by_id(saved.id, "acme").await.unwrap().body, "original");
    }

    #[tokio::test]
    async fn pages_are_ordered_by_creation() {
        let repo = InMemoryRepository::new();
        for (body, minutes) in [("c", 3), ("a", 1), ("e", 5), ("b", 2), ("d", 4)] {
            repo.save(note(body, minutes), "acme").await.unwrap();
        }
        repo.save(note("other tenant", 0), "globex").await.unwrap();

        let first = repo.find_page("acme", PageRequest::new(0, 2)).await.unwrap();
        let second = repo.find_page("acme", PageRequest::new(1, 2)).await.unwrap();
        let third = repo.find_page("acme", PageRequest::new(2, 2)).await.unwrap();

        let bodies = |p: &Page<Note>| p.items.iter().map(|n| n.body.clone()).collect::<Vec<_>>();
        assert_eq!(bodies(&first), vec!["a", "b"]);
        assert_eq!(bodies(&second), vec!["c", "d"]);
        assert_eq!(bodies(&third), vec!["e"]);
        assert_eq!(first.total_elements, 5);
        assert_eq!(first.total_pages, 3);

        let all = repo.find_all("acme").await.unwrap();
        assert_eq!(all.len(), 5);
        assert_eq!(all[0].body, "a");
    }

    #[tokio::test]
    async fn page_size_is_clamped() {
        let repo = InMemoryRepository::new().with_max_page_size(2);
        for (body, minutes) in [("a", 1), ("b", 2), ("c", 3)] {
            repo.save(note(body, minutes), "acme").await.unwrap();
        }

        let empty_request = repo.find_page("acme", PageRequest::new(0, 0)).await.unwrap();
        assert_eq!(empty_request.size, 1);
        assert_eq!(empty_request.items.len(), 1);
        assert_eq!(empty_request.total_pages, 3);

        let oversized = repo.find_page("acme", PageRequest::new(0, 500)).await.unwrap();
        assert_eq!(oversized.size, 2);
        assert_eq!(oversized.items.len(), 2);
        assert_eq!(oversized.total_pages, 2);
    }
}
