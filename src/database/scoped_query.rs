use serde_json::{Map, Value};

use crate::repository::RepositoryError;

/// Column every scoped table carries; always bound as `$1`.
pub const TENANT_COLUMN: &str = "tenant_id";

/// Columns never rewritten by an upsert.
const IMMUTABLE_COLUMNS: [&str; 3] = ["id", TENANT_COLUMN, "created_at"];

/// SQL text for the tenant-scoped statements of one table.
///
/// Rows are read back as `row_to_json` documents so entities only need serde
/// support, and written through `jsonb_populate_record` so column types come
/// from the table definition.
#[derive(Debug, Clone)]
pub struct ScopedQuery {
    table: String,
}

impl ScopedQuery {
    pub fn new(table: impl Into<String>) -> Result<Self, RepositoryError> {
        let table = table.into();
        validate_identifier(&table)?;
        Ok(Self { table })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// `$1` tenant, `$2` id
    pub fn select_by_id(&self) -> String {
        format!(
            "SELECT row_to_json(r) AS record FROM \"{}\" r WHERE r.\"{}\" = $1 AND r.\"id\" = $2",
            self.table, TENANT_COLUMN
        )
    }

    /// `$1` tenant
    pub fn select_all(&self) -> String {
        format!(
            "SELECT row_to_json(r) AS record FROM \"{}\" r WHERE r.\"{}\" = $1 {}",
            self.table,
            TENANT_COLUMN,
            Self::stable_order()
        )
    }

    /// `$1` tenant
    pub fn select_page(&self, limit: u32, offset: u64) -> String {
        format!("{} LIMIT {} OFFSET {}", self.select_all(), limit, offset)
    }

    /// `$1` tenant
    pub fn count(&self) -> String {
        format!(
            "SELECT COUNT(*) AS count FROM \"{}\" WHERE \"{}\" = $1",
            self.table, TENANT_COLUMN
        )
    }

    /// `$1` tenant, `$2` id
    pub fn exists(&self) -> String {
        format!(
            "SELECT EXISTS(SELECT 1 FROM \"{}\" WHERE \"{}\" = $1 AND \"id\" = $2) AS found",
            self.table, TENANT_COLUMN
        )
    }

    /// `$1` tenant, `$2` id
    pub fn delete(&self) -> String {
        format!(
            "DELETE FROM \"{}\" WHERE \"{}\" = $1 AND \"id\" = $2",
            self.table, TENANT_COLUMN
        )
    }

    /// `$1` requesting tenant, `$2` id. Only used for audit logging.
    pub fn owned_elsewhere(&self) -> String {
        format!(
            "SELECT EXISTS(SELECT 1 FROM \"{}\" WHERE \"{}\" <> $1 AND \"id\" = $2) AS found",
            self.table, TENANT_COLUMN
        )
    }

    /// `$1` tenant, `$2` entity document (already stamped with the tenant).
    ///
    /// A conflicting id owned by another tenant matches no row, so nothing is
    /// returned and nothing is written.
    pub fn upsert(&self, document: &Map<String, Value>) -> Result<String, RepositoryError> {
        let mut assignments = Vec::new();
        for column in document.keys() {
            validate_identifier(column)?;
            if IMMUTABLE_COLUMNS.contains(&column.as_str()) {
                continue;
            }
            assignments.push(format!("\"{0}\" = EXCLUDED.\"{0}\"", column));
        }

        let conflict = if assignments.is_empty() {
            // Nothing mutable: still touch the row so RETURNING reports ownership
            format!("\"{0}\" = EXCLUDED.\"{0}\"", TENANT_COLUMN)
        } else {
            assignments.join(", ")
        };

        Ok(format!(
            "WITH saved AS (\
             INSERT INTO \"{table}\" SELECT * FROM jsonb_populate_record(NULL::\"{table}\", $2) \
             ON CONFLICT (\"id\") DO UPDATE SET {conflict} \
             WHERE \"{table}\".\"{tenant}\" = $1 \
             RETURNING *) \
             SELECT row_to_json(saved) AS record FROM saved",
            table = self.table,
            tenant = TENANT_COLUMN,
            conflict = conflict,
        ))
    }

    fn stable_order() -> &'static str {
        "ORDER BY r.\"created_at\" ASC, r.\"id\" ASC"
    }
}

fn validate_identifier(name: &str) -> Result<(), RepositoryError> {
    let mut chars = name.chars();
    let valid_start = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
    if !valid_start || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(RepositoryError::InvalidIdentifier(name.to_string()));
    }
    Ok(())
}
