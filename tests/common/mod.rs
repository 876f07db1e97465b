#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::{header, Method, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use inticky_tenancy::app::{router, AppState};
use inticky_tenancy::auth::{generate_jwt, Claims};
use inticky_tenancy::config::{default_excluded_paths, AppConfig, ResolverKind};
use inticky_tenancy::context::Roles;
use inticky_tenancy::database::models::Ticket;
use inticky_tenancy::middleware::{PathExclusions, TenantInterceptor};
use inticky_tenancy::repository::InMemoryRepository;
use inticky_tenancy::resolver::{self, ResolutionError, ResolvedIdentity, TenantResolver};

pub const SECRET: &str = "integration-test-secret";

pub fn test_config(kind: ResolverKind) -> AppConfig {
    let mut config = AppConfig::development();
    config.tenant.resolver = kind;
    config.security.jwt_secret = SECRET.to_string();
    config.security.enable_audit_logging = true;
    config.security.enable_cors = false;
    config.api.enable_request_logging = false;
    config
}

pub struct TestApp {
    pub router: Router,
    pub tickets: Arc<InMemoryRepository<Ticket>>,
    pub resolver_calls: Arc<AtomicUsize>,
}

impl TestApp {
    pub fn spawn(kind: ResolverKind) -> Self {
        let config = test_config(kind);
        let tickets = Arc::new(
            InMemoryRepository::<Ticket>::new()
                .with_audit(true)
                .with_max_page_size(config.repository.max_page_size),
        );
        let resolver_calls = Arc::new(AtomicUsize::new(0));

        let counting = CountingResolver {
            inner: resolver::from_config(&config),
            calls: resolver_calls.clone(),
        };
        let interceptor = TenantInterceptor::new(
            Arc::new(counting),
            PathExclusions::new(default_excluded_paths()),
        );

        let state = AppState::new(Arc::new(config), tickets.clone(), None);
        Self {
            router: router(state, interceptor),
            tickets,
            resolver_calls,
        }
    }

    pub fn resolver_calls(&self) -> usize {
        self.resolver_calls.load(Ordering::SeqCst)
    }

    pub async fn send(&self, request: Request) -> Result<(StatusCode, Value)> {
        send(&self.router, request).await
    }
}

/// Delegates to the configured resolver and counts invocations.
pub struct CountingResolver {
    pub inner: Arc<dyn TenantResolver>,
    pub calls: Arc<AtomicUsize>,
}

impl TenantResolver for CountingResolver {
    fn resolve(&self, request: &Request) -> Result<ResolvedIdentity, ResolutionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.resolve(request)
    }
}

pub async fn send(router: &Router, request: Request) -> Result<(StatusCode, Value)> {
    let response = router.clone().oneshot(request).await.context("router call failed")?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    Ok((status, body))
}

pub fn token(tenant: &str, user: &str, roles: &str) -> String {
    let claims = Claims::new(user, tenant, Some(format!("{user}@{tenant}.test")), &Roles::parse_csv(roles), 1).expect("claims");
    generate_jwt(&claims, SECRET).expect("token")
}

/// Request builder with optional tenant headers.
pub struct Req {
    builder: axum::http::request::Builder,
}

impl Req {
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            builder: Request::builder().method(method).uri(path),
        }
    }

    pub fn get(path: &str) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: &str) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn delete(path: &str) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn tenant(mut self, tenant: &str) -> Self {
        self.builder = self.builder.header("X-Tenant-ID", tenant);
        self
    }

    pub fn user(mut self, user: &str, roles: &str) -> Self {
        self.builder = self.builder.header("X-User-ID", user).header("X-User-Roles", roles);
        self
    }

    pub fn bearer(mut self, token: &str) -> Self {
        self.builder = self.builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        self
    }

    pub fn empty(self) -> Request {
        self.builder.body(Body::empty()).expect("request")
    }

    pub fn json(self, body: Value) -> Request {
        self.builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }
}
