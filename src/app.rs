//! Router assembly shared by the server binary and the integration tests.

use std::sync::Arc;

use axum::{
    http::{HeaderName, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::database::{models::Ticket, DatabaseManager};
use crate::handlers::{protected, public};
use crate::middleware::{tenant_context_middleware, TenantInterceptor};
use crate::repository::{ScopedRepository, TenantScopedRepository};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tickets: ScopedRepository<Ticket>,
    /// `None` when running on the in-memory repository
    pub database: Option<DatabaseManager>,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        tickets: Arc<dyn TenantScopedRepository<Ticket>>,
        database: Option<DatabaseManager>,
    ) -> Self {
        Self {
            config,
            tickets: ScopedRepository::new(tickets),
            database,
        }
    }
}

/// Full application router using the resolver and exclusions from config.
pub fn app(state: AppState) -> Router {
    let interceptor = TenantInterceptor::from_config(&state.config);
    router(state, interceptor)
}

/// Router with an explicit interceptor, so tests can swap the resolver.
pub fn router(state: AppState, interceptor: TenantInterceptor) -> Router {
    let config = state.config.clone();

    let mut app = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        // Tenant-scoped
        .merge(context_routes())
        .merge(ticket_routes())
        .merge(tenant_routes())
        .with_state(state)
        .layer(from_fn_with_state(Arc::new(interceptor), tenant_context_middleware));

    if config.security.enable_cors {
        app = app.layer(cors_layer(&config));
    }
    if config.api.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }
    if config.api.catch_panics {
        // Outermost, so a handler panic unwinds through the tenant guard first
        app = app.layer(CatchPanicLayer::new());
    }
    app
}

fn context_routes() -> Router<AppState> {
    Router::new().route("/api/context/whoami", get(protected::context::whoami))
}

fn ticket_routes() -> Router<AppState> {
    use protected::tickets;

    Router::new()
        .route("/api/tickets", get(tickets::ticket_list).post(tickets::ticket_create))
        .route("/api/tickets/count", get(tickets::ticket_count))
        .route("/api/tickets/:id", get(tickets::ticket_get).delete(tickets::ticket_delete))
}

fn tenant_routes() -> Router<AppState> {
    Router::new().route("/api/tenants/:tenant_id/access", get(protected::tenants::tenant_access))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    let mut headers = vec![axum::http::header::AUTHORIZATION, axum::http::header::CONTENT_TYPE];
    for name in [
        &config.tenant.tenant_header,
        &config.tenant.user_header,
        &config.tenant.roles_header,
    ] {
        if let Ok(header) = HeaderName::try_from(name.as_str()) {
            headers.push(header);
        }
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(headers)
}
