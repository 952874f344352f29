//! Axum router wiring.

use axum::{
    routing::{get, post},
    Router,
};

use crate::{app_state::AppState, ops, transport};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/command/:token", post(transport::webhook::command))
        .route("/admin", get(transport::admin::index))
        .route("/admin/", get(transport::admin::index))
        .route("/admin/apply", post(transport::admin::apply))
        .route("/admin/pause", post(transport::admin::pause))
        .route("/healthz", get(ops::healthz))
        .route("/metrics", get(ops::metrics))
        .with_state(state)
}
