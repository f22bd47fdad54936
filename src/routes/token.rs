use crate::handlers::issue_token;
use crate::state::AppState;
use axum::{routing::get, Router};

/// GET /token?username=
pub fn token_routes(state: AppState) -> Router {
    Router::new()
        .route("/token", get(issue_token))
        .with_state(state)
}
