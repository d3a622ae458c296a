use super::controller;
use crate::app::AppState;
use axum::Router;
use axum::routing::{get, post};

pub fn register_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/v1/fines",
            post(controller::create_fine).get(controller::list_fines),
        )
        .route("/v1/fines/health", get(controller::health))
        .route("/v1/fines/summary", get(controller::fines_summary))
        .route("/v1/fines/:fine_id", get(controller::get_fine))
        .route("/v1/fines/:fine_id/status", post(controller::update_status))
        .route("/v1/fines/:fine_id/notes", post(controller::add_note))
        .route(
            "/v1/fines/:fine_id/payment-intent",
            post(controller::create_payment_intent),
        )
        .route(
            "/v1/fines/:fine_id/payment-confirm",
            post(controller::confirm_payment),
        )
        .route("/v1/fines/:fine_id/receipt", get(controller::get_receipt))
        .route("/v1/payments/webhook", post(controller::gateway_webhook))
        .with_state(state)
}
