use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use sqlx::{postgres::PgRow, types::Json, PgPool, Row};
use std::marker::PhantomData;
use uuid::Uuid;

use super::{
    audit_cross_tenant, Page, PageRequest, RepositoryError, TenantScoped, TenantScopedRepository,
    DEFAULT_MAX_PAGE_SIZE,
};
use crate::database::scoped_query::{ScopedQuery, TENANT_COLUMN};

/// PostgreSQL-backed repository for one entity table.
///
/// Entities travel as JSON documents in both directions, so the only
/// requirement on `T` beyond [`TenantScoped`] is serde support whose field
/// names match the table's columns.
pub struct PgRepository<T> {
    pool: PgPool,
    query: ScopedQuery,
    audit: bool,
    max_page_size: u32,
    _entity: PhantomData<fn() -> T>,
}

impl<T> PgRepository<T>
where
    T: TenantScoped + Serialize + DeserializeOwned,
{
    pub fn new(pool: PgPool) -> Result<Self, RepositoryError> {
        Ok(Self {
            pool,
            query: ScopedQuery::new(T::TABLE)?,
            audit: false,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            _entity: PhantomData,
        })
    }

    pub fn with_audit(mut self, audit: bool) -> Self {
        self.audit = audit;
        self
    }

    pub fn with_max_page_size(mut self, max_page_size: u32) -> Self {
        self.max_page_size = max_page_size;
        self
    }

    fn decode(row: &PgRow) -> Result<T, RepositoryError> {
        let record: Value = row.try_get("record")?;
        Ok(serde_json::from_value(record)?)
    }

    /// Costs one extra query, so it only runs when auditing is on.
    async fn audit_if_foreign(&self, operation: &str, id: Uuid, tenant_id: &str) -> Result<(), RepositoryError> {
        if !self.audit {
            return Ok(());
        }
        let row = sqlx::query(&self.query.owned_elsewhere())
            .bind(tenant_id)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        let found: bool = row.try_get("found")?;
        if found {
            audit_cross_tenant(operation, self.query.table(), id, tenant_id);
        }
        Ok(())
    }
}

#[async_trait]
impl<T> TenantScopedRepository<T> for PgRepository<T>
where
    T: TenantScoped + Serialize + DeserializeOwned,
{
    async fn find_by_id(&self, id: Uuid, tenant_id: &str) -> Result<Option<T>, RepositoryError> {
        let row = sqlx::query(&self.query.select_by_id())
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(Self::decode(&row)?)),
            None => {
                self.audit_if_foreign("find", id, tenant_id).await?;
                Ok(None)
            }
        }
    }

    async fn find_all(&self, tenant_id: &str) -> Result<Vec<T>, RepositoryError> {
        let rows = sqlx::query(&self.query.select_all())
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::decode).collect()
    }

    async fn find_page(&self, tenant_id: &str, page: PageRequest) -> Result<Page<T>, RepositoryError> {
        let page = page.bounded(self.max_page_size);
        let total = self.count(tenant_id).await?;
        let rows = sqlx::query(&self.query.select_page(page.size, page.offset()))
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await?;
        let items = rows.iter().map(Self::decode).collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, total))
    }

    async fn count(&self, tenant_id: &str) -> Result<u64, RepositoryError> {
        let row = sqlx::query(&self.query.count())
            .bind(tenant_id)
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = row.try_get("count")?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn exists_by_id(&self, id: Uuid, tenant_id: &str) -> Result<bool, RepositoryError> {
        let row = sqlx::query(&self.query.exists())
            .bind(tenant_id)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("found")?)
    }

    async fn delete_by_id(&self, id: Uuid, tenant_id: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query(&self.query.delete())
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            self.audit_if_foreign("delete", id, tenant_id).await?;
        }
        Ok(())
    }

    async fn save(&self, mut entity: T, tenant_id: &str) -> Result<T, RepositoryError> {
        entity.set_tenant_id(tenant_id.to_string());
        let id = entity.id();

        let mut document = match serde_json::to_value(&entity)? {
            Value::Object(map) => map,
            other => {
                return Err(RepositoryError::Serialization(serde::ser::Error::custom(format!(
                    "{} entity serialized to {} instead of an object",
                    T::TABLE,
                    other
                ))))
            }
        };
        document.insert(TENANT_COLUMN.to_string(), Value::String(tenant_id.to_string()));

        let sql = self.query.upsert(&document)?;
        let row = sqlx::query(&sql)
            .bind(tenant_id)
            .bind(Json(Value::Object(document)))
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Self::decode(&row),
            None => {
                // Conflict on an id that belongs to another tenant
                if self.audit {
                    audit_cross_tenant("save", self.query.table(), id, tenant_id);
                }
                Err(RepositoryError::NotFound)
            }
        }
    }
}
