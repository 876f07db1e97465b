// handlers/protected/tickets.rs - /api/tickets handlers
//
// Reads go through the ScopedRepository, which takes the tenant from the
// context store. Create takes the identity explicitly via CurrentTenant.

use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::app::AppState;
use crate::context::{self, CurrentTenant};
use crate::database::models::{NewTicket, Ticket};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::repository::{Page, PageRequest};

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
}

fn parse_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::bad_request("Invalid ticket id"))
}

/// GET /api/tickets?page=&size=
pub async fn ticket_list(State(state): State<AppState>, Query(query): Query<PageQuery>) -> ApiResult<Page<Ticket>> {
    let request = PageRequest::new(
        query.page.unwrap_or(0),
        query.size.unwrap_or(state.config.repository.default_page_size),
    )
    .bounded(state.config.repository.max_page_size);

    let page = state.tickets.find_page(request).await?;
    Ok(ApiResponse::success(page))
}

/// POST /api/tickets
pub async fn ticket_create(
    State(state): State<AppState>,
    CurrentTenant(identity): CurrentTenant,
    axum::Json(body): axum::Json<NewTicket>,
) -> ApiResult<Ticket> {
    if body.title.trim().is_empty() {
        return Err(ApiError::bad_request("Ticket title is required"));
    }

    let ticket = Ticket::open(body, identity.user_id.clone());
    let saved = state.tickets.save(ticket).await?;
    tracing::info!(
        "Created ticket {} for tenant {} by {:?}",
        saved.ticket_number,
        identity.tenant_id,
        context::user_id()
    );
    Ok(ApiResponse::created(saved))
}

/// GET /api/tickets/count
pub async fn ticket_count(State(state): State<AppState>) -> ApiResult<Value> {
    let count = state.tickets.count().await?;
    Ok(ApiResponse::success(json!({ "count": count })))
}

/// GET /api/tickets/:id
pub async fn ticket_get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Ticket> {
    let ticket = state.tickets.get_by_id(parse_id(&id)?).await?;
    Ok(ApiResponse::success(ticket))
}

/// DELETE /api/tickets/:id - 204 whether or not anything was removed
pub async fn ticket_delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.tickets.delete_by_id(parse_id(&id)?).await?;
    Ok(ApiResponse::no_content())
}
