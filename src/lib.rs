//! Pet store benchmark API: JWT-gated pet lookups and creation over SQLite or PostgreSQL.

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod migration;
pub mod model;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use auth::{Authenticator, Scope};
pub use bootstrap::{shutdown_signal, Database};
pub use config::{AuthSettings, BackendConfig, DatabaseKind, Settings};
pub use error::{AppError, ConfigError, StoreError};
pub use model::{NewPet, Pet};
pub use routes::{app, common_routes, pet_routes, token_routes};
pub use service::PetService;
pub use state::AppState;
pub use store::{PetLookup, PetStore};
