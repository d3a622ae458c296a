use super::crud;
use super::schema::{
    CreateViolationRequest, CreateViolationResponse, GetViolationResponse, ListViolationsResponse,
    UpdateViolationRequest, UpdateViolationResponse,
};
use crate::app::AppState;
use crate::module::error::AppError;
use crate::service::auth_service::resolve_actor;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use serde::Deserialize;
use tracing::{error, info};

#[derive(Debug, Deserialize)]
pub struct ListViolationsQuery {
    pub active: Option<bool>,
}

pub async fn create_violation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateViolationRequest>,
) -> impl IntoResponse {
    let actor = match resolve_actor(&state, &headers) {
        Ok(actor) => actor,
        Err(err) => return error_create(err),
    };
    match crud::create_violation(&state, &actor, req).await {
        Ok(resp) => {
            if let Some(violation) = &resp.violation {
                info!(violation_id = %violation.violation_id, code = %violation.code, "violation created");
            }
            (axum::http::StatusCode::OK, Json(resp))
        }
        Err(err) => error_create(err),
    }
}

pub async fn get_violation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(violation_id): Path<String>,
) -> impl IntoResponse {
    if let Err(err) = resolve_actor(&state, &headers) {
        return error_get(err);
    }
    match crud::get_violation(&state, &violation_id).await {
        Ok(resp) => (axum::http::StatusCode::OK, Json(resp)),
        Err(err) => error_get(err),
    }
}

pub async fn list_violations(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListViolationsQuery>,
) -> impl IntoResponse {
    if let Err(err) = resolve_actor(&state, &headers) {
        return error_list(err);
    }
    match crud::list_violations(&state, query.active.unwrap_or(false)).await {
        Ok(resp) => (axum::http::StatusCode::OK, Json(resp)),
        Err(err) => error_list(err),
    }
}

pub async fn update_violation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(violation_id): Path<String>,
    Json(req): Json<UpdateViolationRequest>,
) -> impl IntoResponse {
    let actor = match resolve_actor(&state, &headers) {
        Ok(actor) => actor,
        Err(err) => return error_update(err),
    };
    match crud::update_violation(&state, &actor, &violation_id, req).await {
        Ok(resp) => {
            info!(violation_id = %violation_id, "violation updated");
            (axum::http::StatusCode::OK, Json(resp))
        }
        Err(err) => error_update(err),
    }
}

fn error_create(err: AppError) -> (axum::http::StatusCode, Json<CreateViolationResponse>) {
    error!(error_code = err.code, reason = %err.message, "violation create rejected");
    (
        err.status,
        Json(CreateViolationResponse {
            created: false,
            violation: None,
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}

fn error_get(err: AppError) -> (axum::http::StatusCode, Json<GetViolationResponse>) {
    error!(error_code = err.code, reason = %err.message, "violation lookup failed");
    (
        err.status,
        Json(GetViolationResponse {
            found: false,
            violation: None,
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}

fn error_list(err: AppError) -> (axum::http::StatusCode, Json<ListViolationsResponse>) {
    error!(error_code = err.code, reason = %err.message, "violation listing rejected");
    (
        err.status,
        Json(ListViolationsResponse {
            found: false,
            total: 0,
            violations: Vec::new(),
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}

fn error_update(err: AppError) -> (axum::http::StatusCode, Json<UpdateViolationResponse>) {
    error!(error_code = err.code, reason = %err.message, "violation update rejected");
    (
        err.status,
        Json(UpdateViolationResponse {
            updated: false,
            violation: None,
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}
