use super::model::UserRecord;
use super::schema::{
    CreateUserRequest, CreateUserResponse, GetUserResponse, ListUsersResponse, MintTokenRequest,
    MintTokenResponse, Role, UpdateUserRequest, UpdateUserResponse, UserView,
};
use crate::app::AppState;
use crate::infra::USERS_COLLECTION;
use crate::module::error::AppError;
use crate::service::auth_service::{self, Actor};
use crate::service::validation_service::{
    validate_create_user_request, validate_update_user_request,
};
use chrono::Utc;
use mongodb::Collection;
use mongodb::bson::doc;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct UserStore {
    inner: Mutex<HashMap<String, UserRecord>>,
}

pub fn find_user(store: &UserStore, user_id: &str) -> Result<Option<UserRecord>, AppError> {
    Ok(lock_store(store)?.get(user_id).cloned())
}

pub async fn create_user(
    state: &AppState,
    actor: &Actor,
    req: CreateUserRequest,
) -> Result<CreateUserResponse, AppError> {
    if !actor.is_admin() {
        return Err(AppError::forbidden(
            "FORBIDDEN_ROLE",
            "only admins may manage accounts",
        ));
    }
    validate_create_user_request(&req)?;

    let record = UserRecord {
        user_id: format!("usr-{}", Uuid::new_v4()),
        full_name: req.full_name.trim().to_string(),
        role: req.role,
        license_number: req.license_number.map(|l| l.trim().to_string()),
        active: true,
        created_at: Utc::now().timestamp(),
    };
    {
        let mut inner = lock_store(&state.users)?;
        inner.insert(record.user_id.clone(), record.clone());
    }
    persist_user(state, &record).await?;

    Ok(CreateUserResponse {
        created: true,
        user: Some(to_view(&record)),
        error_code: None,
        reason: "account created".to_string(),
    })
}

pub async fn get_user(
    state: &AppState,
    actor: &Actor,
    user_id: &str,
) -> Result<GetUserResponse, AppError> {
    if !actor.is_admin() && actor.id != user_id {
        return Err(AppError::forbidden(
            "NOT_ACCOUNT_OWNER",
            "accounts are only visible to admins or their owner",
        ));
    }
    let record = find_user(&state.users, user_id)?
        .ok_or_else(|| AppError::not_found("USER_NOT_FOUND", "account not found"))?;
    Ok(GetUserResponse {
        found: true,
        user: Some(to_view(&record)),
        error_code: None,
        reason: "account found".to_string(),
    })
}

pub async fn list_users(
    state: &AppState,
    actor: &Actor,
    role_filter: Option<Role>,
) -> Result<ListUsersResponse, AppError> {
    if !actor.is_admin() {
        return Err(AppError::forbidden(
            "FORBIDDEN_ROLE",
            "only admins may list accounts",
        ));
    }
    let mut users = {
        let inner = lock_store(&state.users)?;
        inner
            .values()
            .filter(|u| role_filter.map_or(true, |r| u.role == r))
            .map(to_view)
            .collect::<Vec<_>>()
    };
    users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let total = users.len();
    Ok(ListUsersResponse {
        found: total > 0,
        total,
        users,
        error_code: None,
        reason: if total > 0 {
            "accounts found".to_string()
        } else {
            "no accounts match the filter".to_string()
        },
    })
}

pub async fn update_user(
    state: &AppState,
    actor: &Actor,
    user_id: &str,
    req: UpdateUserRequest,
) -> Result<UpdateUserResponse, AppError> {
    if !actor.is_admin() {
        return Err(AppError::forbidden(
            "FORBIDDEN_ROLE",
            "only admins may manage accounts",
        ));
    }
    validate_update_user_request(&req)?;

    let record = {
        let mut inner = lock_store(&state.users)?;
        let record = inner
            .get_mut(user_id)
            .ok_or_else(|| AppError::not_found("USER_NOT_FOUND", "account not found"))?;
        if let Some(name) = req.full_name {
            record.full_name = name.trim().to_string();
        }
        if let Some(license) = req.license_number {
            record.license_number = Some(license.trim().to_string());
        }
        if let Some(active) = req.active {
            record.active = active;
        }
        record.clone()
    };
    persist_user(state, &record).await?;

    Ok(UpdateUserResponse {
        updated: true,
        user: Some(to_view(&record)),
        error_code: None,
        reason: "account updated".to_string(),
    })
}

pub async fn mint_token(
    state: &AppState,
    req: MintTokenRequest,
) -> Result<MintTokenResponse, AppError> {
    let Some(bootstrap_secret) = &state.config.auth_bootstrap_secret else {
        return Err(AppError::unauthorized(
            "TOKEN_MINT_DISABLED",
            "token minting is not configured",
        ));
    };
    if req.bootstrap_secret != *bootstrap_secret {
        return Err(AppError::unauthorized(
            "INVALID_BOOTSTRAP_SECRET",
            "bootstrap secret does not match",
        ));
    }
    let user = find_user(&state.users, &req.user_id)?
        .ok_or_else(|| AppError::not_found("USER_NOT_FOUND", "account not found"))?;
    if !user.active {
        return Err(AppError::unauthorized(
            "ACCOUNT_INACTIVE",
            "account is deactivated",
        ));
    }
    let (token, expires_at) = auth_service::issue_access_token(
        &user.user_id,
        user.role,
        &state.config.jwt_secret,
        state.config.jwt_ttl_seconds,
    )
    .map_err(|e| AppError::internal("TOKEN_ISSUE_FAILED", e))?;

    Ok(MintTokenResponse {
        issued: true,
        access_token: Some(token),
        expires_at: Some(expires_at),
        error_code: None,
        reason: "access token issued".to_string(),
    })
}

fn to_view(record: &UserRecord) -> UserView {
    UserView {
        user_id: record.user_id.clone(),
        full_name: record.full_name.clone(),
        role: record.role,
        license_number: record.license_number.clone(),
        active: record.active,
        created_at: record.created_at,
    }
}

fn lock_store(store: &UserStore) -> Result<MutexGuard<'_, HashMap<String, UserRecord>>, AppError> {
    store
        .inner
        .lock()
        .map_err(|_| AppError::internal("STORE_LOCK_ERROR", "user store lock poisoned"))
}

async fn persist_user(state: &AppState, record: &UserRecord) -> Result<(), AppError> {
    let Some(infra) = &state.infra else {
        return Ok(());
    };
    let users: Collection<UserRecord> = infra.mongo_db.collection(USERS_COLLECTION);
    users
        .replace_one(doc! { "user_id": &record.user_id }, record.clone())
        .upsert(true)
        .await
        .map_err(|e| AppError::internal("PERSISTENCE_ERROR", format!("user upsert failed: {e}")))?;
    Ok(())
}
