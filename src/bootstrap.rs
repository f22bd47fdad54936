//! Process lifecycle for the storage backend: connect, provision, tear down.

use crate::config::BackendConfig;
use crate::error::{AppError, ConfigError};
use crate::migration::{connect_any, drop_database, ensure_database_exists, ensure_tables, seed, sqlite_url, Dialect};
use crate::store::{DisabledStore, PetStore, SqlPetStore};
use sqlx::AnyPool;
use std::io::ErrorKind;
use std::sync::Arc;
use tracing::info;

/// Connected backend. Holds no pool when persistence is disabled.
pub struct Database {
    backend: BackendConfig,
    pool: Option<AnyPool>,
}

impl Database {
    /// Connect to the configured backend, creating the PostgreSQL database first if missing.
    pub async fn open(backend: BackendConfig, max_connections: u32) -> Result<Self, AppError> {
        let pool = match &backend {
            BackendConfig::None => {
                info!("Database=None, persistence disabled");
                None
            }
            BackendConfig::Sqlite { path } => {
                info!(path = %path.display(), "using SQLite database file");
                Some(connect_any(&sqlite_url(path), max_connections).await?)
            }
            BackendConfig::Postgres { url, database } => {
                ensure_database_exists(url, database).await?;
                info!(database = %database, "using PostgreSQL database");
                Some(connect_any(url, max_connections).await?)
            }
            BackendConfig::SqlServer { .. } => {
                return Err(ConfigError::DriverUnavailable("SqlServer").into());
            }
        };
        Ok(Database { backend, pool })
    }

    fn dialect(&self) -> Option<(Dialect, &'static str)> {
        match self.backend {
            BackendConfig::Sqlite { .. } => Some((Dialect::Sqlite, "sqlite")),
            BackendConfig::Postgres { .. } => Some((Dialect::Postgres, "postgres")),
            BackendConfig::None | BackendConfig::SqlServer { .. } => None,
        }
    }

    pub fn store(&self) -> Arc<dyn PetStore> {
        match (&self.pool, self.dialect()) {
            (Some(pool), Some((_, name))) => Arc::new(SqlPetStore::new(pool.clone(), name)),
            _ => Arc::new(DisabledStore),
        }
    }

    /// Create the tables and seed an empty store.
    pub async fn provision(&self) -> Result<(), AppError> {
        let (Some(pool), Some((dialect, name))) = (&self.pool, self.dialect()) else {
            return Ok(());
        };
        ensure_tables(pool, dialect).await?;
        seed(&SqlPetStore::new(pool.clone(), name)).await?;
        Ok(())
    }

    /// Close the pool, then delete what `open` and `provision` created.
    pub async fn teardown(self) -> Result<(), AppError> {
        if let Some(pool) = self.pool {
            pool.close().await;
        }
        match self.backend {
            BackendConfig::Sqlite { path } => match tokio::fs::remove_file(&path).await {
                Ok(()) => info!(path = %path.display(), "deleted SQLite database file"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(AppError::Internal(format!(
                        "failed to delete {}: {}",
                        path.display(),
                        e
                    )))
                }
            },
            BackendConfig::Postgres { url, database } => drop_database(&url, &database).await?,
            BackendConfig::None | BackendConfig::SqlServer { .. } => {}
        }
        Ok(())
    }
}

/// Resolves on Ctrl-C or, on unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl-C, shutting down"),
        () = terminate => info!("received SIGTERM, shutting down"),
    }
}
