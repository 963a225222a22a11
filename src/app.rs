use axum::Router;
use http::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use http::Method;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::routes::{credentials, health, rule_engine, tasks, upload};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(|origin: &HeaderValue, _| {
            origin.as_bytes().starts_with(b"http://localhost:") || origin.as_bytes().starts_with(b"http://127.0.0.1:")
        }))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    Router::<AppState>::new()
        .nest("/health", health::router())
        .nest("/v1/upload", upload::router())
        .nest("/v1/file-credentials", credentials::router())
        .nest("/v1/rule-engine", rule_engine::router())
        .nest("/v1/tasks", tasks::router())
        .with_state(state)
        .layer(cors)
}
