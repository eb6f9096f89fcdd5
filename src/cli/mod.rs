use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};

use crate::app::{app, AppState};
use crate::config::{AppConfig, DatabaseBackend};
use crate::database::{DatabaseManager, EmployeeStore, InMemoryEmployeeRepository, PgEmployeeRepository};
use crate::security::credentials::CredentialStore;
use crate::services::{EmployeeCache, EmployeeServiceImpl};

#[derive(Debug, Parser)]
#[command(name = "employee-api")]
#[command(about = "Employee records REST API")]
#[command(version)]
pub struct Cli {
    #[arg(long, help = "Port to listen on (overrides EMPLOYEE_API_PORT)")]
    pub port: Option<u16>,

    #[arg(long, help = "Address to bind (overrides EMPLOYEE_API_HOST)")]
    pub host: Option<String>,

    #[arg(long, help = "Use the in-process store instead of PostgreSQL")]
    pub in_memory: bool,

    #[arg(long, help = "Do not create the schema on startup")]
    pub skip_migrations: bool,
}

impl Cli {
    /// Command-line flags take precedence over environment configuration.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if self.in_memory {
            config.database.backend = DatabaseBackend::Memory;
        }
        if self.skip_migrations {
            config.database.run_migrations = false;
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = crate::config::config().clone();
    cli.apply(&mut config);
    config.validate().context("invalid configuration")?;
    info!("Starting employee-api in {:?} mode", config.environment);

    let (store, database): (Arc<dyn EmployeeStore>, Option<DatabaseManager>) =
        match config.database.backend {
            DatabaseBackend::Memory => {
                warn!("Using the in-memory employee store; data is lost on restart");
                let store: Arc<dyn EmployeeStore> = Arc::new(InMemoryEmployeeRepository::new());
                (store, None)
            }
            DatabaseBackend::Postgres => {
                let manager = DatabaseManager::connect_lazy(&config.database)?;
                if config.database.run_migrations {
                    manager.migrate().await.context("schema creation failed")?;
                } else if let Err(e) = manager.health_check().await {
                    // Lazy pool: keep serving, health reports DOWN until it connects
                    warn!("Database not reachable at startup: {}", e);
                }
                let store: Arc<dyn EmployeeStore> =
                    Arc::new(PgEmployeeRepository::new(manager.pool().clone()));
                (store, Some(manager))
            }
        };

    let service = EmployeeServiceImpl::new(store, EmployeeCache::new(config.cache.enabled));
    let credentials =
        CredentialStore::from_config(&config.security).context("failed to hash account passwords")?;
    let state = AppState::new(Arc::new(service), credentials);
    let router = app(state, &config);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Employee API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(database) = database {
        database.close().await;
    }
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown"),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from(["employee-api", "--port", "9090", "--in-memory", "--skip-migrations"]);
        let mut config = AppConfig::production();
        cli.apply(&mut config);
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.database.backend, DatabaseBackend::Memory);
        assert!(!config.database.run_migrations);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn no_flags_keep_config() {
        let cli = Cli::parse_from(["employee-api"]);
        let mut config = AppConfig::staging();
        cli.apply(&mut config);
        assert_eq!(config.database.backend, DatabaseBackend::Postgres);
        assert!(config.database.run_migrations);
    }
}
