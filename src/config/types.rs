//! Resolved runtime settings: storage backend and token parameters.

use crate::error::ConfigError;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Value of the `Database` setting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DatabaseKind {
    /// Empty setting: local SQLite file, for runs outside a benchmark.
    Sqlite,
    PostgreSql,
    SqlServer,
    /// No persistence configured.
    None,
}

impl DatabaseKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DatabaseKind::Sqlite => "",
            DatabaseKind::PostgreSql => "PostgreSql",
            DatabaseKind::SqlServer => "SqlServer",
            DatabaseKind::None => "None",
        }
    }
}

impl FromStr for DatabaseKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(DatabaseKind::Sqlite),
            "PostgreSql" => Ok(DatabaseKind::PostgreSql),
            "SqlServer" => Ok(DatabaseKind::SqlServer),
            "None" => Ok(DatabaseKind::None),
            other => Err(ConfigError::UnsupportedDatabase(other.to_string())),
        }
    }
}

/// Storage backend after validation; only these shapes reach startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendConfig {
    None,
    Sqlite { path: PathBuf },
    /// `url` already points at `database`.
    Postgres { url: String, database: String },
    SqlServer { connection_string: String },
}

impl BackendConfig {
    pub fn kind(&self) -> DatabaseKind {
        match self {
            BackendConfig::None => DatabaseKind::None,
            BackendConfig::Sqlite { .. } => DatabaseKind::Sqlite,
            BackendConfig::Postgres { .. } => DatabaseKind::PostgreSql,
            BackendConfig::SqlServer { .. } => DatabaseKind::SqlServer,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AuthSettings {
    /// HS256 secret. A random one is generated when absent.
    pub secret: Option<String>,
    pub issuer: String,
    pub audience: String,
    pub token_ttl: Duration,
}

impl Default for AuthSettings {
    fn default() -> Self {
        AuthSettings {
            secret: None,
            issuer: "pet-store".into(),
            audience: "pet-store-clients".into(),
            token_ttl: Duration::from_secs(3600),
        }
    }
}
