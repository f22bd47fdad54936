//! Router assembly.

pub mod common;
pub mod pet;
pub mod token;

pub use common::common_routes;
pub use pet::pet_routes;
pub use token::token_routes;

use crate::state::AppState;
use axum::Router;
use tower_http::{
    limit::RequestBodyLimitLayer,
    trace::{DefaultOnFailure, TraceLayer},
};
use tracing::Level;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Every route plus request tracing and the body limit.
/// 5xx responses are logged once, by `AppError::into_response`.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .merge(token_routes(state.clone()))
        .merge(pet_routes(state))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http().on_failure(DefaultOnFailure::new().level(Level::DEBUG)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Authenticator, Scope};
    use crate::config::AuthSettings;
    use crate::store::memory::{InsertMode, MemoryStore};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tower::ServiceExt;
    use tracing::{Event, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    /// Counts ERROR events seen on the current thread.
    struct ErrorEvents(Arc<AtomicUsize>);

    impl<S: Subscriber> Layer<S> for ErrorEvents {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == Level::ERROR {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn state() -> AppState {
        AppState::new(Arc::new(MemoryStore::new()), Authenticator::new(&AuthSettings::default()))
    }

    #[tokio::test]
    async fn app_serves_every_surface() {
        let state = state();
        let app = app(state.clone());
        for uri in ["/health", "/ready", "/version", "/token?username=bob"] {
            let res = app.clone().oneshot(Request::get(uri).body(Body::empty()).unwrap()).await.unwrap();
            assert_eq!(res.status(), StatusCode::OK, "{}", uri);
        }
        let res = app.clone().oneshot(Request::get("/pet/1").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(app.oneshot(Request::get("/nope").body(Body::empty()).unwrap()).await.unwrap().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let state = state();
        let token = state.auth.issue("writer", &[Scope::Reader, Scope::Writer]).unwrap();
        let body = format!("{{\"name\": \"{}\"}}", "x".repeat(MAX_BODY_BYTES));
        let req = Request::post("/pet")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::CONTENT_LENGTH, body.len())
            .body(Body::from(body))
            .unwrap();
        let res = app(state).oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn server_error_is_logged_once() {
        let errors = Arc::new(AtomicUsize::new(0));
        let _guard = tracing::subscriber::set_default(
            tracing_subscriber::registry().with(ErrorEvents(errors.clone())),
        );

        let store = Arc::new(MemoryStore::new());
        store.set_mode(InsertMode::Fail);
        let state = AppState::new(store, Authenticator::new(&AuthSettings::default()));
        let token = state.auth.issue("writer", &[Scope::Writer]).unwrap();
        let req = Request::post("/pet")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"name": "Tom"}"#))
            .unwrap();
        let res = app(state).oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(errors.load(Ordering::SeqCst), 1);
    }
}
