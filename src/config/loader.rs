//! Settings from the command line and environment (`Database`, `ConnectionString`, ...).

use crate::config::{AuthSettings, BackendConfig, DatabaseKind};
use crate::error::ConfigError;
use clap::Parser;
use sqlx::postgres::PgConnectOptions;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone, Debug, Parser)]
#[command(name = "pet-store", version, about = "Pet store benchmark API")]
pub struct Settings {
    /// Storage backend: empty for a local SQLite file, PostgreSql, SqlServer or None.
    #[arg(long, env = "Database", default_value = "")]
    pub database: String,

    /// Connection string for networked backends.
    #[arg(long, env = "ConnectionString", hide_env_values = true)]
    pub connection_string: Option<String>,

    #[arg(long, env = "SQLITE_PATH", default_value = "PetStore.db")]
    pub sqlite_path: PathBuf,

    /// PostgreSQL database owned by this application; replaces the one in the connection string.
    #[arg(long, env = "DATABASE_NAME", default_value = "pet_store")]
    pub database_name: String,

    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:5000")]
    pub bind: SocketAddr,

    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    #[arg(long, env = "JWT_ISSUER", default_value = "pet-store")]
    pub jwt_issuer: String,

    #[arg(long, env = "JWT_AUDIENCE", default_value = "pet-store-clients")]
    pub jwt_audience: String,

    #[arg(long, env = "TOKEN_TTL_SECS", default_value_t = 3600)]
    pub token_ttl_secs: u64,

    #[arg(long, env = "MAX_CONNECTIONS", default_value_t = 5)]
    pub max_connections: u32,
}

impl Settings {
    /// Validate the database settings and pick a backend. Fails on anything a backend cannot start with.
    pub fn backend(&self) -> Result<BackendConfig, ConfigError> {
        let kind: DatabaseKind = self.database.parse()?;
        match kind {
            DatabaseKind::None => Ok(BackendConfig::None),
            DatabaseKind::Sqlite => Ok(BackendConfig::Sqlite {
                path: self.sqlite_path.clone(),
            }),
            DatabaseKind::PostgreSql => {
                let connection_string = self.required_connection_string("PostgreSql")?;
                PgConnectOptions::from_str(connection_string).map_err(|e| {
                    ConfigError::InvalidConnectionString {
                        backend: "PostgreSql",
                        reason: e.to_string(),
                    }
                })?;
                if self.database_name.trim().is_empty() {
                    return Err(ConfigError::InvalidSetting {
                        name: "database-name",
                        reason: "must not be empty".into(),
                    });
                }
                Ok(BackendConfig::Postgres {
                    url: with_database(connection_string, &self.database_name)?,
                    database: self.database_name.clone(),
                })
            }
            DatabaseKind::SqlServer => Ok(BackendConfig::SqlServer {
                connection_string: self.required_connection_string("SqlServer")?.to_string(),
            }),
        }
    }

    pub fn auth(&self) -> AuthSettings {
        AuthSettings {
            secret: self.jwt_secret.clone().filter(|s| !s.is_empty()),
            issuer: self.jwt_issuer.clone(),
            audience: self.jwt_audience.clone(),
            token_ttl: Duration::from_secs(self.token_ttl_secs),
        }
    }

    fn required_connection_string(&self, backend: &'static str) -> Result<&str, ConfigError> {
        self.connection_string
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingConnectionString(backend))
    }
}

/// Point a PostgreSQL URL at `database`, keeping credentials, host and query options.
fn with_database(url: &str, database: &str) -> Result<String, ConfigError> {
    let authority_start = url.find("://").ok_or_else(|| ConfigError::InvalidConnectionString {
        backend: "PostgreSql",
        reason: "expected a postgres:// URL".into(),
    })? + 3;
    let (head, rest) = url.split_at(authority_start);
    let (location, query) = match rest.find('?') {
        Some(i) => rest.split_at(i),
        None => (rest, ""),
    };
    let authority = location.split('/').next().unwrap_or("");
    Ok(format!("{}{}/{}{}", head, authority, database, query))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(args: &[&str]) -> Settings {
        let mut argv = vec!["pet-store"];
        argv.extend_from_slice(args);
        Settings::try_parse_from(argv).unwrap()
    }

    #[test]
    fn empty_database_selects_local_sqlite() {
        let backend = settings(&["--database", "", "--sqlite-path", "pets.db"]).backend().unwrap();
        assert_eq!(backend, BackendConfig::Sqlite { path: "pets.db".into() });
    }

    #[test]
    fn none_disables_persistence() {
        let backend = settings(&["--database", "None"]).backend().unwrap();
        assert_eq!(backend, BackendConfig::None);
    }

    #[test]
    fn unknown_database_is_rejected() {
        let err = settings(&["--database", "MySql"]).backend().unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedDatabase(ref s) if s == "MySql"));
    }

    #[test]
    fn postgres_requires_connection_string() {
        let err = settings(&["--database", "PostgreSql"]).backend().unwrap_err();
        assert!(matches!(err, ConfigError::MissingConnectionString("PostgreSql")));

        let err = settings(&["--database", "PostgreSql", "--connection-string", "  "])
            .backend()
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingConnectionString(_)));
    }

    #[test]
    fn postgres_rejects_unparseable_connection_string() {
        let err = settings(&["--database", "PostgreSql", "--connection-string", "Host=db;Database=x;"])
            .backend()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConnectionString { backend: "PostgreSql", .. }));
    }

    #[test]
    fn postgres_url_is_pointed_at_own_database() {
        let backend = settings(&[
            "--database",
            "PostgreSql",
            "--connection-string",
            "postgres://bench:secret@db:5432/hello?sslmode=disable",
        ])
        .backend()
        .unwrap();
        assert_eq!(
            backend,
            BackendConfig::Postgres {
                url: "postgres://bench:secret@db:5432/pet_store?sslmode=disable".into(),
                database: "pet_store".into(),
            }
        );
    }

    #[test]
    fn with_database_adds_missing_path() {
        assert_eq!(with_database("postgres://localhost", "pets").unwrap(), "postgres://localhost/pets");
    }

    #[test]
    fn sql_server_validates_connection_string() {
        let err = settings(&["--database", "SqlServer"]).backend().unwrap_err();
        assert!(matches!(err, ConfigError::MissingConnectionString("SqlServer")));

        let backend = settings(&["--database", "SqlServer", "--connection-string", "Server=db;"])
            .backend()
            .unwrap();
        assert_eq!(backend.kind(), DatabaseKind::SqlServer);
    }

    #[test]
    fn auth_settings_ignore_empty_secret() {
        let auth = settings(&["--jwt-secret", "", "--token-ttl-secs", "60"]).auth();
        assert!(auth.secret.is_none());
        assert_eq!(auth.token_ttl, Duration::from_secs(60));
    }
}
