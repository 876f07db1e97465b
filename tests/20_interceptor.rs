mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use axum::{http::StatusCode, middleware::from_fn_with_state, routing::get, Router};
use tower_http::catch_panic::CatchPanicLayer;

use common::{send, CountingResolver, Req, TestApp};
use inticky_tenancy::config::{default_excluded_paths, ResolverKind};
use inticky_tenancy::context;
use inticky_tenancy::middleware::{tenant_context_middleware, PathExclusions, TenantInterceptor};
use inticky_tenancy::resolver::HeaderTenantResolver;

#[tokio::test]
async fn excluded_paths_skip_resolution() -> Result<()> {
    let app = TestApp::spawn(ResolverKind::Header);

    let (status, body) = app.send(Req::get("/health").empty()).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");

    let (status, _) = app.send(Req::get("/").tenant("acme").empty()).await?;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(app.resolver_calls(), 0);
    Ok(())
}

#[tokio::test]
async fn missing_tenant_is_rejected_before_handlers() -> Result<()> {
    let app = TestApp::spawn(ResolverKind::Header);

    let (status, body) = app.send(Req::get("/api/tickets/count").empty()).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], true);
    assert_eq!(body["code"], "TENANT_RESOLUTION_FAILED");

    let (status, _) = app.send(Req::get("/api/tickets/count").tenant("   ").empty()).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.resolver_calls(), 2);
    Ok(())
}

#[tokio::test]
async fn header_identity_reaches_whoami() -> Result<()> {
    let app = TestApp::spawn(ResolverKind::Header);

    let (status, body) = app
        .send(Req::get("/api/context/whoami").tenant("acme").user("u1", "ADMIN, AGENT").empty())
        .await?;
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    assert_eq!(data["tenantId"], "acme");
    assert_eq!(data["userId"], "u1");
    assert_eq!(data["roles"], serde_json::json!(["ADMIN", "AGENT"]));
    assert_eq!(data["isAdmin"], true);
    assert_eq!(data["isAgent"], true);
    assert_eq!(data["authenticated"], false);
    assert_eq!(data["isValid"], false);
    Ok(())
}

#[tokio::test]
async fn handler_panic_leaves_no_residue() -> Result<()> {
    let seen_in_handler = Arc::new(Mutex::new(None::<String>));
    let calls = Arc::new(AtomicUsize::new(0));

    let interceptor = TenantInterceptor::new(
        Arc::new(CountingResolver {
            inner: Arc::new(HeaderTenantResolver::default()),
            calls: calls.clone(),
        }),
        PathExclusions::new(default_excluded_paths()),
    );

    let seen = seen_in_handler.clone();
    let router = Router::new()
        .route(
            "/api/boom",
            get(move || {
                let seen = seen.clone();
                async move {
                    *seen.lock().unwrap() = context::tenant_id();
                    if seen.lock().unwrap().is_some() {
                        panic!("handler failure");
                    }
                    StatusCode::NO_CONTENT
                }
            }),
        )
        .route(
            "/api/echo-tenant",
            get(|| async { context::describe() }),
        )
        .layer(from_fn_with_state(Arc::new(interceptor), tenant_context_middleware))
        .layer(CatchPanicLayer::new());

    let (status, _) = send(&router, Req::get("/api/boom").tenant("acme").empty()).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(seen_in_handler.lock().unwrap().as_deref(), Some("acme"));

    let (status, body) = send(&router, Req::get("/api/echo-tenant").tenant("globex").empty()).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "TenantContext{tenantId='globex', userId='null', roles=''}");

    let (status, _) = send(&router, Req::get("/api/echo-tenant").empty()).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert!(!context::is_set());
    Ok(())
}

#[tokio::test]
async fn concurrent_requests_keep_their_own_tenant() -> Result<()> {
    let app = Arc::new(TestApp::spawn(ResolverKind::Header));

    let requests = (0..32).map(|i| {
        let app = app.clone();
        tokio::spawn(async move {
            let tenant = format!("tenant-{i}");
            let (status, body) = app
                .send(Req::get("/api/context/whoami").tenant(&tenant).user("u", "AGENT").empty())
                .await?;
            anyhow::ensure!(status == StatusCode::OK, "status {status}");
            anyhow::ensure!(body["data"]["tenantId"] == tenant.as_str(), "saw {}", body["data"]["tenantId"]);
            anyhow::Ok(())
        })
    });

    for joined in futures::future::join_all(requests).await {
        joined??;
    }
    Ok(())
}
