use super::crud;
use super::schema::{
    AddFineNoteRequest, AddFineNoteResponse, ConfirmPaymentRequest, ConfirmPaymentResponse,
    CreateFineRequest, CreateFineResponse, CreatePaymentIntentResponse, FineStatus,
    FinesSummaryResponse, GatewayWebhookEvent, GetFineResponse, HealthResponse, ListFinesResponse,
    ReceiptResponse, UpdateFineStatusRequest, UpdateFineStatusResponse, WebhookAckResponse,
};
use crate::app::AppState;
use crate::module::error::AppError;
use crate::service::auth_service::resolve_actor;
use crate::service::webhook_signature_service::verify_webhook_signature;
use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use serde::Deserialize;
use tracing::{error, info, warn};

#[derive(Debug, Deserialize)]
pub struct ListFinesQuery {
    pub status: Option<String>,
}

pub async fn create_fine(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateFineRequest>,
) -> impl IntoResponse {
    let actor = match resolve_actor(&state, &headers) {
        Ok(actor) => actor,
        Err(err) => return error_create(err),
    };
    match crud::create_fine(&state, &actor, req).await {
        Ok(resp) => {
            if let Some(fine) = &resp.fine {
                info!(
                    fine_id = %fine.fine_id,
                    driver_id = %fine.driver_id,
                    violation_code = %fine.violation_code,
                    "fine issued"
                );
            }
            (axum::http::StatusCode::OK, Json(resp))
        }
        Err(err) => error_create(err),
    }
}

pub async fn get_fine(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(fine_id): Path<String>,
) -> impl IntoResponse {
    let actor = match resolve_actor(&state, &headers) {
        Ok(actor) => actor,
        Err(err) => return error_get(err),
    };
    match crud::get_fine(&state, &actor, &fine_id).await {
        Ok(resp) => (axum::http::StatusCode::OK, Json(resp)),
        Err(err) => error_get(err),
    }
}

pub async fn list_fines(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListFinesQuery>,
) -> impl IntoResponse {
    let actor = match resolve_actor(&state, &headers) {
        Ok(actor) => actor,
        Err(err) => return error_list(err),
    };
    let status_filter = match query.status.as_deref() {
        Some(raw) => match FineStatus::parse(raw) {
            Some(status) => Some(status),
            None => {
                return error_list(AppError::bad_request(
                    "INVALID_STATUS_FILTER",
                    "status filter is not a known fine status",
                ));
            }
        },
        None => None,
    };
    match crud::list_fines(&state, &actor, status_filter).await {
        Ok(resp) => (axum::http::StatusCode::OK, Json(resp)),
        Err(err) => error_list(err),
    }
}

pub async fn fines_summary(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let actor = match resolve_actor(&state, &headers) {
        Ok(actor) => actor,
        Err(err) => return error_summary(err),
    };
    match crud::fines_summary(&state, &actor).await {
        Ok(resp) => (axum::http::StatusCode::OK, Json(resp)),
        Err(err) => error_summary(err),
    }
}

pub async fn update_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(fine_id): Path<String>,
    Json(req): Json<UpdateFineStatusRequest>,
) -> impl IntoResponse {
    let actor = match resolve_actor(&state, &headers) {
        Ok(actor) => actor,
        Err(err) => return error_status(err),
    };
    let next_status = req.next_status;
    match crud::update_status(&state, &actor, &fine_id, req).await {
        Ok(resp) => {
            info!(
                fine_id = %fine_id,
                next_status = next_status.as_str(),
                actor_id = %actor.id,
                "fine status updated"
            );
            (axum::http::StatusCode::OK, Json(resp))
        }
        Err(err) => error_status(err),
    }
}

pub async fn add_note(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(fine_id): Path<String>,
    Json(req): Json<AddFineNoteRequest>,
) -> impl IntoResponse {
    let actor = match resolve_actor(&state, &headers) {
        Ok(actor) => actor,
        Err(err) => return error_note(err),
    };
    match crud::add_note(&state, &actor, &fine_id, req).await {
        Ok(resp) => {
            info!(fine_id = %fine_id, actor_id = %actor.id, "note appended");
            (axum::http::StatusCode::OK, Json(resp))
        }
        Err(err) => error_note(err),
    }
}

pub async fn create_payment_intent(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(fine_id): Path<String>,
) -> impl IntoResponse {
    let actor = match resolve_actor(&state, &headers) {
        Ok(actor) => actor,
        Err(err) => return error_intent(err),
    };
    match crud::create_payment_intent(&state, &actor, &fine_id).await {
        Ok(resp) => {
            if let Some(intent) = &resp.intent {
                info!(fine_id = %fine_id, intent_id = %intent.intent_id, "payment intent opened");
            }
            (axum::http::StatusCode::OK, Json(resp))
        }
        Err(err) => error_intent(err),
    }
}

pub async fn confirm_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(fine_id): Path<String>,
    Json(req): Json<ConfirmPaymentRequest>,
) -> impl IntoResponse {
    let actor = match resolve_actor(&state, &headers) {
        Ok(actor) => actor,
        Err(err) => return error_confirm(err),
    };
    match crud::confirm_payment(&state, &actor, &fine_id, req).await {
        Ok(resp) => {
            info!(
                fine_id = %fine_id,
                idempotent = resp.idempotent,
                "payment confirmation processed"
            );
            (axum::http::StatusCode::OK, Json(resp))
        }
        Err(err) => error_confirm(err),
    }
}

pub async fn gateway_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let signature = match headers
        .get("x-gateway-signature")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        Some(sig) => sig.to_string(),
        None => {
            return error_webhook(AppError::unauthorized(
                "MISSING_WEBHOOK_SIGNATURE",
                "x-gateway-signature header required",
            ));
        }
    };
    if let Err(e) =
        verify_webhook_signature(&body, &signature, &state.config.gateway_webhook_secret)
    {
        return error_webhook(AppError::unauthorized("INVALID_WEBHOOK_SIGNATURE", e));
    }

    let event: GatewayWebhookEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            return error_webhook(AppError::bad_request(
                "INVALID_WEBHOOK_PAYLOAD",
                format!("event decode failed: {e}"),
            ));
        }
    };

    match crud::apply_gateway_event(&state, event).await {
        Ok(resp) => {
            if resp.applied {
                info!(fine_id = ?resp.fine_id, "gateway event applied");
            } else {
                warn!(fine_id = ?resp.fine_id, reason = %resp.reason, "gateway event ignored");
            }
            (axum::http::StatusCode::OK, Json(resp))
        }
        Err(err) => error_webhook(err),
    }
}

pub async fn get_receipt(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(fine_id): Path<String>,
) -> impl IntoResponse {
    let actor = match resolve_actor(&state, &headers) {
        Ok(actor) => actor,
        Err(err) => return error_receipt(err),
    };
    match crud::get_receipt(&state, &actor, &fine_id).await {
        Ok(resp) => (axum::http::StatusCode::OK, Json(resp)),
        Err(err) => error_receipt(err),
    }
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    (
        axum::http::StatusCode::OK,
        Json(HealthResponse {
            ok: true,
            mongo_available: state.infra.is_some(),
            error_code: None,
            reason: "healthy".to_string(),
        }),
    )
}

fn error_create(err: AppError) -> (axum::http::StatusCode, Json<CreateFineResponse>) {
    error!(error_code = err.code, reason = %err.message, "fine create rejected");
    (
        err.status,
        Json(CreateFineResponse {
            created: false,
            fine: None,
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}

fn error_get(err: AppError) -> (axum::http::StatusCode, Json<GetFineResponse>) {
    error!(error_code = err.code, reason = %err.message, "fine lookup failed");
    (
        err.status,
        Json(GetFineResponse {
            found: false,
            fine: None,
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}

fn error_list(err: AppError) -> (axum::http::StatusCode, Json<ListFinesResponse>) {
    error!(error_code = err.code, reason = %err.message, "fine listing rejected");
    (
        err.status,
        Json(ListFinesResponse {
            found: false,
            total: 0,
            fines: Vec::new(),
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}

fn error_summary(err: AppError) -> (axum::http::StatusCode, Json<FinesSummaryResponse>) {
    error!(error_code = err.code, reason = %err.message, "fine summary rejected");
    (
        err.status,
        Json(FinesSummaryResponse {
            total: 0,
            pending: 0,
            overdue: 0,
            disputed: 0,
            paid: 0,
            cancelled: 0,
            by_currency: Vec::new(),
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}

fn error_status(err: AppError) -> (axum::http::StatusCode, Json<UpdateFineStatusResponse>) {
    error!(error_code = err.code, reason = %err.message, "fine status update rejected");
    (
        err.status,
        Json(UpdateFineStatusResponse {
            updated: false,
            idempotent: false,
            fine: None,
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}

fn error_note(err: AppError) -> (axum::http::StatusCode, Json<AddFineNoteResponse>) {
    error!(error_code = err.code, reason = %err.message, "note append rejected");
    (
        err.status,
        Json(AddFineNoteResponse {
            added: false,
            note_count: 0,
            note: None,
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}

fn error_intent(err: AppError) -> (axum::http::StatusCode, Json<CreatePaymentIntentResponse>) {
    error!(error_code = err.code, reason = %err.message, "payment intent rejected");
    (
        err.status,
        Json(CreatePaymentIntentResponse {
            created: false,
            intent: None,
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}

fn error_confirm(err: AppError) -> (axum::http::StatusCode, Json<ConfirmPaymentResponse>) {
    error!(error_code = err.code, reason = %err.message, "payment confirmation rejected");
    (
        err.status,
        Json(ConfirmPaymentResponse {
            confirmed: false,
            idempotent: false,
            fine: None,
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}

fn error_webhook(err: AppError) -> (axum::http::StatusCode, Json<WebhookAckResponse>) {
    error!(error_code = err.code, reason = %err.message, "gateway webhook rejected");
    (
        err.status,
        Json(WebhookAckResponse {
            received: false,
            applied: false,
            idempotent: false,
            fine_id: None,
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}

fn error_receipt(err: AppError) -> (axum::http::StatusCode, Json<ReceiptResponse>) {
    error!(error_code = err.code, reason = %err.message, "receipt request rejected");
    (
        err.status,
        Json(ReceiptResponse {
            available: false,
            receipt: None,
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}
