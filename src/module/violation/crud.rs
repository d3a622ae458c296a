use super::model::ViolationRecord;
use super::schema::{
    CreateViolationRequest, CreateViolationResponse, GetViolationResponse, ListViolationsResponse,
    UpdateViolationRequest, UpdateViolationResponse, ViolationView,
};
use crate::app::AppState;
use crate::infra::VIOLATIONS_COLLECTION;
use crate::module::error::AppError;
use crate::service::auth_service::Actor;
use crate::service::validation_service::{
    validate_create_violation_request, validate_update_violation_request,
};
use chrono::Utc;
use mongodb::Collection;
use mongodb::bson::doc;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct ViolationStore {
    inner: Mutex<ViolationStoreInner>,
}

#[derive(Debug, Default)]
struct ViolationStoreInner {
    by_id: HashMap<String, ViolationRecord>,
    id_by_code: HashMap<String, String>,
}

pub fn find_violation(
    store: &ViolationStore,
    violation_id: &str,
) -> Result<Option<ViolationRecord>, AppError> {
    Ok(lock_store(store)?.by_id.get(violation_id).cloned())
}

pub async fn create_violation(
    state: &AppState,
    actor: &Actor,
    req: CreateViolationRequest,
) -> Result<CreateViolationResponse, AppError> {
    if !actor.is_admin() {
        return Err(AppError::forbidden(
            "FORBIDDEN_ROLE",
            "only admins may manage the violation catalog",
        ));
    }
    validate_create_violation_request(&req)?;

    let code = req.code.trim().to_ascii_uppercase();
    let now = Utc::now().timestamp();
    let record = {
        let mut inner = lock_store(&state.violations)?;
        if inner.id_by_code.contains_key(&code) {
            return Err(AppError::conflict(
                "VIOLATION_CODE_EXISTS",
                "a violation with this code already exists",
            ));
        }
        let record = ViolationRecord {
            violation_id: format!("vio-{}", Uuid::new_v4()),
            code: code.clone(),
            name: req.name.trim().to_string(),
            description: req.description.trim().to_string(),
            default_amount: req.default_amount,
            currency: req.currency,
            severity: req.severity,
            category: req.category,
            points: req.points,
            active: req.active.unwrap_or(true),
            created_by: actor.id.clone(),
            created_at: now,
            updated_at: now,
        };
        inner.id_by_code.insert(code, record.violation_id.clone());
        inner
            .by_id
            .insert(record.violation_id.clone(), record.clone());
        record
    };
    persist_violation(state, &record).await?;

    Ok(CreateViolationResponse {
        created: true,
        violation: Some(to_view(&record)),
        error_code: None,
        reason: "violation created".to_string(),
    })
}

pub async fn get_violation(
    state: &AppState,
    violation_id: &str,
) -> Result<GetViolationResponse, AppError> {
    let record = find_violation(&state.violations, violation_id)?
        .ok_or_else(|| AppError::not_found("VIOLATION_NOT_FOUND", "violation not found"))?;
    Ok(GetViolationResponse {
        found: true,
        violation: Some(to_view(&record)),
        error_code: None,
        reason: "violation found".to_string(),
    })
}

pub async fn list_violations(
    state: &AppState,
    active_only: bool,
) -> Result<ListViolationsResponse, AppError> {
    let mut violations = {
        let inner = lock_store(&state.violations)?;
        inner
            .by_id
            .values()
            .filter(|v| !active_only || v.active)
            .map(to_view)
            .collect::<Vec<_>>()
    };
    violations.sort_by(|a, b| a.code.cmp(&b.code));
    let total = violations.len();
    Ok(ListViolationsResponse {
        found: total > 0,
        total,
        violations,
        error_code: None,
        reason: if total > 0 {
            "violations found".to_string()
        } else {
            "no violations match the filter".to_string()
        },
    })
}

pub async fn update_violation(
    state: &AppState,
    actor: &Actor,
    violation_id: &str,
    req: UpdateViolationRequest,
) -> Result<UpdateViolationResponse, AppError> {
    if !actor.is_admin() {
        return Err(AppError::forbidden(
            "FORBIDDEN_ROLE",
            "only admins may manage the violation catalog",
        ));
    }
    validate_update_violation_request(&req)?;

    let record = {
        let mut inner = lock_store(&state.violations)?;
        let record = inner
            .by_id
            .get_mut(violation_id)
            .ok_or_else(|| AppError::not_found("VIOLATION_NOT_FOUND", "violation not found"))?;
        if let Some(name) = req.name {
            record.name = name.trim().to_string();
        }
        if let Some(description) = req.description {
            record.description = description.trim().to_string();
        }
        if let Some(amount) = req.default_amount {
            record.default_amount = amount;
        }
        if let Some(currency) = req.currency {
            record.currency = currency;
        }
        if let Some(severity) = req.severity {
            record.severity = severity;
        }
        if let Some(category) = req.category {
            record.category = category;
        }
        if let Some(points) = req.points {
            record.points = points;
        }
        if let Some(active) = req.active {
            record.active = active;
        }
        record.updated_at = Utc::now().timestamp();
        record.clone()
    };
    persist_violation(state, &record).await?;

    Ok(UpdateViolationResponse {
        updated: true,
        violation: Some(to_view(&record)),
        error_code: None,
        reason: "violation updated".to_string(),
    })
}

fn to_view(record: &ViolationRecord) -> ViolationView {
    ViolationView {
        violation_id: record.violation_id.clone(),
        code: record.code.clone(),
        name: record.name.clone(),
        description: record.description.clone(),
        default_amount: record.default_amount,
        currency: record.currency,
        severity: record.severity,
        category: record.category,
        points: record.points,
        active: record.active,
        created_by: record.created_by.clone(),
        created_at: record.created_at,
        updated_at: record.updated_at,
    }
}

fn lock_store(store: &ViolationStore) -> Result<MutexGuard<'_, ViolationStoreInner>, AppError> {
    store
        .inner
        .lock()
        .map_err(|_| AppError::internal("STORE_LOCK_ERROR", "violation store lock poisoned"))
}

async fn persist_violation(state: &AppState, record: &ViolationRecord) -> Result<(), AppError> {
    let Some(infra) = &state.infra else {
        return Ok(());
    };
    let violations: Collection<ViolationRecord> =
        infra.mongo_db.collection(VIOLATIONS_COLLECTION);
    violations
        .replace_one(doc! { "violation_id": &record.violation_id }, record.clone())
        .upsert(true)
        .await
        .map_err(|e| {
            AppError::internal("PERSISTENCE_ERROR", format!("violation upsert failed: {e}"))
        })?;
    Ok(())
}
