use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repository::TenantScoped;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    #[default]
    Open,
    InProgress,
    Resolved,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

/// Helpdesk ticket, one row of `tickets`.
///
/// Field names are the column names; the Postgres repository round-trips rows
/// through JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Uuid,
    pub tenant_id: String,
    pub ticket_number: String,
    pub title: String,
    pub description: Option<String>,
    pub status: TicketStatus,
    pub priority: Priority,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for `POST /api/tickets`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTicket {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
}

impl Ticket {
    /// Fresh OPEN ticket. The tenant is left blank; the repository stamps it.
    pub fn open(new: NewTicket, created_by: Option<String>) -> Self {
        let id = Uuid::new_v4();
        let now = Utc::now();
        Self {
            id,
            tenant_id: String::new(),
            ticket_number: ticket_number(id),
            title: new.title.trim().to_string(),
            description: new.description,
            status: TicketStatus::Open,
            priority: new.priority,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }
}

impl TenantScoped for Ticket {
    const TABLE: &'static str = "tickets";

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

/// `TKT-` followed by the first eight hex digits of the id.
fn ticket_number(id: Uuid) -> String {
    let simple = id.simple().to_string().to_uppercase();
    format!("TKT-{}", &simple[..8])
}

/// DDL for the `tickets` table, applied at startup when Postgres is configured.
pub const TICKETS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS "tickets" (
    "id"            UUID PRIMARY KEY,
    "tenant_id"     TEXT NOT NULL,
    "ticket_number" TEXT NOT NULL,
    "title"         TEXT NOT NULL,
    "description"   TEXT,
    "status"        TEXT NOT NULL,
    "priority"      TEXT NOT NULL,
    "created_by"    TEXT,
    "created_at"    TIMESTAMPTZ NOT NULL,
    "updated_at"    TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS "tickets_tenant_created_idx" ON "tickets" ("tenant_id", "created_at", "id");
"#;
