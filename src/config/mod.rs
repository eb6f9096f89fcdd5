use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub cache: CacheConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseBackend {
    /// Process-local store, lost on restart
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    #[serde(skip_serializing)]
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub admin: AccountConfig,
    pub user: AccountConfig,
    pub cors_origins: Vec<String>,
    pub password_hash: PasswordHashConfig,
}

/// Argon2id cost parameters for the stored account passwords
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PasswordHashConfig {
    pub memory_kib: u32,
    pub iterations: u32,
}

impl Default for PasswordHashConfig {
    fn default() -> Self {
        // OWASP 2024 recommendation for Argon2id: m=19 MiB, t=2, p=1
        Self { memory_kib: 19456, iterations: 2 }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    pub username: String,
    #[serde(skip_serializing)]
    pub password: Option<String>,
}

impl std::fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountConfig")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{account} password must be set via environment variable {variable}")]
    MissingPassword { account: &'static str, variable: &'static str },

    #[error("{account} username must be 3-20 characters of letters, digits, '_' or '-'")]
    InvalidUsername { account: &'static str },

    #[error("{account} password must be 8-100 characters with a lowercase letter, an uppercase letter, a digit and one of @$!%*?& (no other symbols)")]
    WeakPassword { account: &'static str },

    #[error("{account} and {other} accounts must use different usernames")]
    DuplicateUsername { account: &'static str, other: &'static str },

    #[error("DATABASE_URL must be set when the postgres backend is selected")]
    MissingDatabaseUrl,
}

const PASSWORD_SYMBOLS: &str = "@$!%*?&";

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
        // Server overrides
        if let Ok(v) = env::var("EMPLOYEE_API_HOST") {
            self.server.host = v;
        }
        if let Some(port) = env::var("EMPLOYEE_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_BACKEND") {
            match v.to_ascii_lowercase().as_str() {
                "memory" | "in-memory" => self.database.backend = DatabaseBackend::Memory,
                "postgres" | "postgresql" => self.database.backend = DatabaseBackend::Postgres,
                other => tracing::warn!("Ignoring unknown DATABASE_BACKEND {:?}", other),
            }
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = v.parse().unwrap_or(self.database.run_migrations);
        }

        // API overrides
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Cache overrides
        if let Ok(v) = env::var("CACHE_ENABLED") {
            self.cache.enabled = v.parse().unwrap_or(self.cache.enabled);
        }

        // Security overrides
        if let Ok(v) = env::var("APP_SECURITY_ADMIN_USERNAME") {
            self.security.admin.username = v;
        }
        if let Ok(v) = env::var("APP_SECURITY_ADMIN_PASSWORD") {
            self.security.admin.password = Some(v);
        }
        if let Ok(v) = env::var("APP_SECURITY_USER_USERNAME") {
            self.security.user.username = v;
        }
        if let Ok(v) = env::var("APP_SECURITY_USER_PASSWORD") {
            self.security.user.password = Some(v);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(v) = env::var("SECURITY_PASSWORD_HASH_MEMORY_KIB").ok().and_then(|s| s.parse().ok()) {
            self.security.password_hash.memory_kib = v;
        }
        if let Some(v) = env::var("SECURITY_PASSWORD_HASH_ITERATIONS").ok().and_then(|s| s.parse().ok()) {
            self.security.password_hash.iterations = v;
        }

        self
    }

    /// Startup checks. The service refuses to run without both passwords.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_account(&self.security.admin, "Admin", "APP_SECURITY_ADMIN_PASSWORD")?;
        validate_account(&self.security.user, "User", "APP_SECURITY_USER_PASSWORD")?;

        if self.security.admin.username == self.security.user.username {
            return Err(ConfigError::DuplicateUsername { account: "Admin", other: "User" });
        }

        if self.database.backend == DatabaseBackend::Postgres
            && self.database.url.as_deref().map_or(true, str::is_empty)
        {
            return Err(ConfigError::MissingDatabaseUrl);
        }

        Ok(())
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                backend: DatabaseBackend::Memory,
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                run_migrations: true,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 1024 * 1024, // 1MB
            },
            cache: CacheConfig { enabled: true },
            security: SecurityConfig {
                admin: AccountConfig { username: "admin".to_string(), password: None },
                user: AccountConfig { username: "user".to_string(), password: None },
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:8080".to_string(),
                    "http://localhost:8081".to_string(),
                ],
                password_hash: PasswordHashConfig::default(),
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                backend: DatabaseBackend::Postgres,
                url: None,
                max_connections: 20,
                connection_timeout: 10,
                run_migrations: true,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 512 * 1024,
            },
            cache: CacheConfig { enabled: true },
            security: SecurityConfig {
                admin: AccountConfig { username: "admin".to_string(), password: None },
                user: AccountConfig { username: "user".to_string(), password: None },
                cors_origins: vec!["https://staging.example.com".to_string()],
                password_hash: PasswordHashConfig::default(),
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                backend: DatabaseBackend::Postgres,
                url: None,
                max_connections: 50,
                connection_timeout: 5,
                run_migrations: false,
            },
            api: ApiConfig {
                enable_request_logging: false,
                max_request_size_bytes: 256 * 1024,
            },
            cache: CacheConfig { enabled: true },
            security: SecurityConfig {
                admin: AccountConfig { username: "admin".to_string(), password: None },
                user: AccountConfig { username: "user".to_string(), password: None },
                cors_origins: vec!["https://app.example.com".to_string()],
                password_hash: PasswordHashConfig::default(),
            },
        }
    }
}

fn validate_account(
    account: &AccountConfig,
    label: &'static str,
    variable: &'static str,
) -> Result<(), ConfigError> {
    let username = &account.username;
    let username_ok = (3..=20).contains(&username.chars().count())
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !username_ok {
        return Err(ConfigError::InvalidUsername { account: label });
    }

    let password = account
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or(ConfigError::MissingPassword { account: label, variable })?;

    if !is_strong_password(password) {
        return Err(ConfigError::WeakPassword { account: label });
    }

    Ok(())
}

fn is_strong_password(password: &str) -> bool {
    let len = password.chars().count();
    (8..=100).contains(&len)
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SYMBOLS.contains(c))
        && password
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || PASSWORD_SYMBOLS.contains(c))
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
