// handlers/public/root.rs - GET / handler

use axum::response::Json;
use serde_json::{json, Value};

pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Inticky tenancy service",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "health": "/health (public)",
                "whoami": "/api/context/whoami (tenant)",
                "tickets": "/api/tickets[/:id|/count] (tenant)",
                "tenants": "/api/tenants/:tenant_id/access (tenant)",
            }
        }
    }))
}
