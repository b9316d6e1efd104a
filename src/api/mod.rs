pub mod routes;

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::event::Processor;
use crate::store::ResultStore;

#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<Processor>,
    pub store: ResultStore,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", axum::routing::get(routes::health::health_check))
        .route("/events", axum::routing::post(routes::events::receive_event))
        .route("/api/scans", axum::routing::get(routes::scans::list_scans))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
