use super::crud;
use super::schema::{
    CreateUserRequest, CreateUserResponse, GetUserResponse, ListUsersResponse, MintTokenRequest,
    MintTokenResponse, Role, UpdateUserRequest, UpdateUserResponse,
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
pub struct ListUsersQuery {
    pub role: Option<String>,
}

pub async fn create_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateUserRequest>,
) -> impl IntoResponse {
    let actor = match resolve_actor(&state, &headers) {
        Ok(actor) => actor,
        Err(err) => return error_create(err),
    };
    match crud::create_user(&state, &actor, req).await {
        Ok(resp) => {
            if let Some(user) = &resp.user {
                info!(user_id = %user.user_id, role = %user.role.as_str(), "account created");
            }
            (axum::http::StatusCode::OK, Json(resp))
        }
        Err(err) => error_create(err),
    }
}

pub async fn get_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    let actor = match resolve_actor(&state, &headers) {
        Ok(actor) => actor,
        Err(err) => return error_get(err),
    };
    match crud::get_user(&state, &actor, &user_id).await {
        Ok(resp) => (axum::http::StatusCode::OK, Json(resp)),
        Err(err) => error_get(err),
    }
}

pub async fn list_users(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListUsersQuery>,
) -> impl IntoResponse {
    let actor = match resolve_actor(&state, &headers) {
        Ok(actor) => actor,
        Err(err) => return error_list(err),
    };
    let role_filter = match query.role.as_deref() {
        Some(raw) => match Role::parse(raw) {
            Some(role) => Some(role),
            None => {
                return error_list(AppError::bad_request(
                    "INVALID_ROLE_FILTER",
                    "role filter is not a known role",
                ));
            }
        },
        None => None,
    };
    match crud::list_users(&state, &actor, role_filter).await {
        Ok(resp) => (axum::http::StatusCode::OK, Json(resp)),
        Err(err) => error_list(err),
    }
}

pub async fn update_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> impl IntoResponse {
    let actor = match resolve_actor(&state, &headers) {
        Ok(actor) => actor,
        Err(err) => return error_update(err),
    };
    match crud::update_user(&state, &actor, &user_id, req).await {
        Ok(resp) => {
            info!(user_id = %user_id, "account updated");
            (axum::http::StatusCode::OK, Json(resp))
        }
        Err(err) => error_update(err),
    }
}

pub async fn mint_token(
    State(state): State<AppState>,
    Json(req): Json<MintTokenRequest>,
) -> impl IntoResponse {
    match crud::mint_token(&state, req).await {
        Ok(resp) => (axum::http::StatusCode::OK, Json(resp)),
        Err(err) => error_mint(err),
    }
}

fn error_create(err: AppError) -> (axum::http::StatusCode, Json<CreateUserResponse>) {
    error!(error_code = err.code, reason = %err.message, "account create rejected");
    (
        err.status,
        Json(CreateUserResponse {
            created: false,
            user: None,
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}

fn error_get(err: AppError) -> (axum::http::StatusCode, Json<GetUserResponse>) {
    error!(error_code = err.code, reason = %err.message, "account lookup failed");
    (
        err.status,
        Json(GetUserResponse {
            found: false,
            user: None,
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}

fn error_list(err: AppError) -> (axum::http::StatusCode, Json<ListUsersResponse>) {
    error!(error_code = err.code, reason = %err.message, "account listing rejected");
    (
        err.status,
        Json(ListUsersResponse {
            found: false,
            total: 0,
            users: Vec::new(),
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}

fn error_update(err: AppError) -> (axum::http::StatusCode, Json<UpdateUserResponse>) {
    error!(error_code = err.code, reason = %err.message, "account update rejected");
    (
        err.status,
        Json(UpdateUserResponse {
            updated: false,
            user: None,
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}

fn error_mint(err: AppError) -> (axum::http::StatusCode, Json<MintTokenResponse>) {
    error!(error_code = err.code, reason = %err.message, "token mint rejected");
    (
        err.status,
        Json(MintTokenResponse {
            issued: false,
            access_token: None,
            expires_at: None,
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}
