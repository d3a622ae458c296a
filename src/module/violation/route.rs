use super::controller;
use crate::app::AppState;
use axum::Router;
use axum::routing::{get, post};

pub fn register_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/v1/violations",
            post(controller::create_violation).get(controller::list_violations),
        )
        .route(
            "/v1/violations/:violation_id",
            get(controller::get_violation).post(controller::update_violation),
        )
        .with_state(state)
}
