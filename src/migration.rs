//! Pet schema DDL, seed data, and creating/dropping the backing database.
//! Tables are created with IF NOT EXISTS; seeding only happens into an empty `pets` table.

use crate::error::{AppError, ConfigError};
use crate::model::{NewCategory, NewImage, NewPet, NewTag};
use crate::sql::count_pets;
use crate::store::{PetStore, SqlPetStore};
use sqlx::any::AnyPoolOptions;
use sqlx::postgres::PgConnectOptions;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{AnyPool, ConnectOptions, Row};
use std::path::Path;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dialect {
    Sqlite,
    Postgres,
}

impl Dialect {
    fn key_column(self) -> &'static str {
        match self {
            Dialect::Sqlite => "id INTEGER PRIMARY KEY",
            Dialect::Postgres => "id BIGINT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY",
        }
    }

    fn int_type(self) -> &'static str {
        match self {
            Dialect::Sqlite => "INTEGER",
            Dialect::Postgres => "BIGINT",
        }
    }
}

fn table_ddl(dialect: Dialect) -> Vec<String> {
    let key = dialect.key_column();
    let int = dialect.int_type();
    vec![
        format!("CREATE TABLE IF NOT EXISTS categories ({}, name TEXT NOT NULL)", key),
        format!(
            "CREATE TABLE IF NOT EXISTS pets ({}, name TEXT NOT NULL, status TEXT, category_id {} REFERENCES categories (id))",
            key, int
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS images ({}, pet_id {} NOT NULL REFERENCES pets (id), url TEXT NOT NULL)",
            key, int
        ),
        format!("CREATE TABLE IF NOT EXISTS tags ({}, name TEXT NOT NULL)", key),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS pet_tags (
                pet_id {int} NOT NULL REFERENCES pets (id),
                tag_id {int} NOT NULL REFERENCES tags (id),
                PRIMARY KEY (pet_id, tag_id)
            )
            "#
        ),
        "CREATE INDEX IF NOT EXISTS pets_status_idx ON pets (status)".to_string(),
        "CREATE INDEX IF NOT EXISTS pets_category_idx ON pets (category_id)".to_string(),
        "CREATE INDEX IF NOT EXISTS tags_name_idx ON tags (name)".to_string(),
    ]
}

/// `sqlite://` URL for a database file, created on first connect.
pub fn sqlite_url(path: &Path) -> String {
    SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .to_url_lossy()
        .to_string()
}

/// Connect an `Any` pool; registers the compiled-in drivers on first use.
pub async fn connect_any(url: &str, max_connections: u32) -> Result<AnyPool, AppError> {
    sqlx::any::install_default_drivers();
    let pool = AnyPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await?;
    Ok(pool)
}

pub async fn ensure_tables(pool: &AnyPool, dialect: Dialect) -> Result<(), AppError> {
    for ddl in table_ddl(dialect) {
        tracing::debug!(sql = %ddl.trim(), "ddl");
        sqlx::query(&ddl).execute(pool).await?;
    }
    Ok(())
}

fn seed_pets() -> Vec<NewPet> {
    vec![
        NewPet {
            id: None,
            name: "Rex".into(),
            status: Some("available".into()),
            category: Some(NewCategory { id: None, name: "Dogs".into() }),
            images: vec![NewImage {
                id: None,
                url: "https://images.example.com/pets/rex.jpg".into(),
            }],
            tags: vec![
                NewTag { id: None, name: "friendly".into() },
                NewTag { id: None, name: "trained".into() },
            ],
        },
        NewPet {
            id: None,
            name: "Whiskers".into(),
            status: Some("pending".into()),
            category: Some(NewCategory { id: None, name: "Cats".into() }),
            images: Vec::new(),
            tags: vec![NewTag { id: None, name: "indoor".into() }],
        },
    ]
}

/// Insert the sample pets when the store is empty. Returns how many were inserted.
pub async fn seed(store: &SqlPetStore) -> Result<usize, AppError> {
    let q = count_pets();
    let row = sqlx::query(&q.sql).fetch_one(store.pool()).await?;
    let existing: i64 = row.try_get("n")?;
    if existing > 0 {
        tracing::debug!(existing, "pets table already populated, skipping seed");
        return Ok(0);
    }
    let pets = seed_pets();
    for pet in &pets {
        store.insert_pet(pet).await?;
    }
    tracing::info!(count = pets.len(), backend = store.backend_name(), "seeded pet store");
    Ok(pets.len())
}

fn admin_options(database_url: &str) -> Result<PgConnectOptions, AppError> {
    let opts = PgConnectOptions::from_str(database_url).map_err(|e| ConfigError::InvalidConnectionString {
        backend: "PostgreSql",
        reason: e.to_string(),
    })?;
    Ok(opts.database("postgres"))
}

/// Create `database` on the server in `database_url` if it does not exist. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str, database: &str) -> Result<(), AppError> {
    if database.is_empty() || database == "postgres" {
        return Ok(());
    }
    let mut conn = admin_options(database_url)?.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(database)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(database)))
            .execute(&mut conn)
            .await?;
        tracing::info!(database, "created database");
    }
    Ok(())
}

/// Drop `database`. All pools on it must be closed first.
pub async fn drop_database(database_url: &str, database: &str) -> Result<(), AppError> {
    if database.is_empty() || database == "postgres" {
        return Ok(());
    }
    let mut conn = admin_options(database_url)?.connect().await?;
    sqlx::query(&format!("DROP DATABASE IF EXISTS {}", quote_ident(database)))
        .execute(&mut conn)
        .await?;
    tracing::info!(database, "dropped database");
    Ok(())
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
