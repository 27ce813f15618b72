use axum::routing::{get, post};
use axum::Router;
use logstore::LogStore;
use tower_http::trace::TraceLayer;

use crate::routes_chain::add_chain;
use crate::state::SharedState;
use crate::telemetry;

pub fn build_router<S: LogStore>(state: SharedState<S>) -> Router {
    Router::new()
        .route("/ct/v1/add-chain", post(add_chain::<S>))
        .route("/metrics", get(serve_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn serve_metrics() -> String {
    telemetry::render_metrics()
}
