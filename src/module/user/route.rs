use super::controller;
use crate::app::AppState;
use axum::Router;
use axum::routing::{get, post};

pub fn register_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/v1/users",
            post(controller::create_user).get(controller::list_users),
        )
        .route(
            "/v1/users/:user_id",
            get(controller::get_user).post(controller::update_user),
        )
        .route("/v1/auth/token", post(controller::mint_token))
        .with_state(state)
}
