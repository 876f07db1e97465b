use std::sync::Arc;

use anyhow::{bail, Context};
use tracing_subscriber::EnvFilter;

use inticky_tenancy::app::{app, AppState};
use inticky_tenancy::config::{self, ResolverKind};
use inticky_tenancy::database::{models::Ticket, DatabaseManager};
use inticky_tenancy::repository::{InMemoryRepository, PgRepository, TenantScopedRepository};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = Arc::new(config::config().clone());
    tracing::info!("Starting inticky tenancy service in {:?} mode", config.environment);

    if config.tenant.resolver == ResolverKind::Jwt && config.security.jwt_secret.is_empty() {
        bail!("JWT_SECRET must be set when TENANT_RESOLVER=jwt");
    }

    let audit = config.security.enable_audit_logging;
    let max_page_size = config.repository.max_page_size;
    let (tickets, database) = match config.repository.database_url {
        Some(_) => {
            let database = DatabaseManager::connect(&config.repository)
                .await
                .context("connecting to database")?;
            database.ensure_schema().await.context("preparing schema")?;
            let repo: Arc<dyn TenantScopedRepository<Ticket>> =
                Arc::new(
                PgRepository::<Ticket>::new(database.pool())?
                    .with_audit(audit)
                    .with_max_page_size(max_page_size),
            );
            (repo, Some(database))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; tickets are kept in memory");
            let repo: Arc<dyn TenantScopedRepository<Ticket>> =
                Arc::new(
                InMemoryRepository::<Ticket>::new()
                    .with_audit(audit)
                    .with_max_page_size(max_page_size),
            );
            (repo, None)
        }
    };

    let state = AppState::new(config.clone(), tickets, database.clone());

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Inticky tenancy service listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(database) = database {
        database.close().await;
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}
