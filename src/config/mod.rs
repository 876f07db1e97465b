use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

/// Development-only signing secret; production deployments must set `JWT_SECRET`.
pub const DEFAULT_JWT_SECRET: &str = "default-secret-key-for-development-only-change-in-production";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub tenant: TenantConfig,
    pub repository: RepositoryConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolverKind {
    /// `X-Tenant-ID` / `X-User-ID` / `X-User-Roles` headers only
    Header,
    /// Bearer JWT first, `X-Tenant-ID` header as tenant fallback
    Jwt,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantConfig {
    pub resolver: ResolverKind,
    pub tenant_header: String,
    pub user_header: String,
    pub roles_header: String,
    /// Path patterns that bypass tenant resolution entirely
    pub excluded_paths: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub database_url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_request_logging: bool,
    pub catch_panics: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub enable_audit_logging: bool,
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
}

impl TenantConfig {
    fn defaults() -> Self {
        Self {
            resolver: ResolverKind::Jwt,
            tenant_header: "X-Tenant-ID".to_string(),
            user_header: "X-User-ID".to_string(),
            roles_header: "X-User-Roles".to_string(),
            excluded_paths: default_excluded_paths(),
        }
    }
}

pub fn default_excluded_paths() -> Vec<String> {
    [
        "/",
        "/health/**",
        "/actuator/**",
        "/error",
        "/swagger-ui/**",
        "/v3/api-docs/**",
        "/api/auth/**",
    ]
    .iter()
    .map(|p| p.to_string())
    .collect()
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Tenant overrides
        if let Ok(v) = env::var("TENANT_RESOLVER") {
            match v.to_ascii_lowercase().as_str() {
                "header" => self.tenant.resolver = ResolverKind::Header,
                "jwt" => self.tenant.resolver = ResolverKind::Jwt,
                other => tracing::warn!("Unknown TENANT_RESOLVER '{}', keeping {:?}", other, self.tenant.resolver),
            }
        }
        if let Ok(v) = env::var("TENANT_HEADER") {
            self.tenant.tenant_header = v;
        }
        if let Ok(v) = env::var("TENANT_USER_HEADER") {
            self.tenant.user_header = v;
        }
        if let Ok(v) = env::var("TENANT_ROLES_HEADER") {
            self.tenant.roles_header = v;
        }
        if let Ok(v) = env::var("TENANT_EXCLUDED_PATHS") {
            self.tenant.excluded_paths = split_list(&v);
        }

        // Repository overrides
        if let Ok(v) = env::var("REPOSITORY_DEFAULT_PAGE_SIZE") {
            self.repository.default_page_size = v.parse().unwrap_or(self.repository.default_page_size);
        }
        if let Ok(v) = env::var("REPOSITORY_MAX_PAGE_SIZE") {
            self.repository.max_page_size = v.parse().unwrap_or(self.repository.max_page_size);
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            if !v.trim().is_empty() {
                self.repository.database_url = Some(v);
            }
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.repository.max_connections = v.parse().unwrap_or(self.repository.max_connections);
        }

        // API overrides
        if let Some(v) = env::var("INTICKY_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_CATCH_PANICS") {
            self.api.catch_panics = v.parse().unwrap_or(self.api.catch_panics);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = split_list(&v);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_AUDIT_LOGGING") {
            self.security.enable_audit_logging = v.parse().unwrap_or(self.security.enable_audit_logging);
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            tenant: TenantConfig::defaults(),
            repository: RepositoryConfig {
                default_page_size: 20,
                max_page_size: 1000,
                database_url: None,
                max_connections: 10,
            },
            api: ApiConfig {
                port: 8080,
                enable_request_logging: true,
                catch_panics: true,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                enable_audit_logging: false,
                jwt_secret: DEFAULT_JWT_SECRET.to_string(),
                jwt_expiry_hours: 24,
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            tenant: TenantConfig::defaults(),
            repository: RepositoryConfig {
                default_page_size: 20,
                max_page_size: 500,
                database_url: None,
                max_connections: 20,
            },
            api: ApiConfig {
                port: 8080,
                enable_request_logging: true,
                catch_panics: true,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.inticky.example.com".to_string()],
                enable_audit_logging: true,
                jwt_secret: DEFAULT_JWT_SECRET.to_string(),
                jwt_expiry_hours: 24,
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            tenant: TenantConfig::defaults(),
            repository: RepositoryConfig {
                default_page_size: 20,
                max_page_size: 100,
                database_url: None,
                max_connections: 50,
            },
            api: ApiConfig {
                port: 8080,
                enable_request_logging: false,
                catch_panics: true,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.inticky.example.com".to_string()],
                enable_audit_logging: true,
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
            },
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
