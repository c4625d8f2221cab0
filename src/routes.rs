use crate::{auth, site, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(site::index))
        .route("/health", get(site::health))
        .route("/metrics", get(site::metrics))
        .route("/login", post(auth::login))
        .fallback(site::not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
