use super::model::{
    DisputeRecord, FineLocation, FineNote, FineRecord, FineStatusTransition, FineVehicle,
    PaymentRecord,
};
use super::schema::{
    AddFineNoteRequest, AddFineNoteResponse, ConfirmPaymentRequest, ConfirmPaymentResponse,
    CreateFineRequest, CreateFineResponse, CreatePaymentIntentResponse, CurrencyCode,
    CurrencyTotalsView, DisputeResolution, DisputeView, FineNoteView, FineStatus,
    FineStatusTransitionView,
    FineView, FinesSummaryResponse, GatewayWebhookEvent, GetFineResponse, ListFinesResponse,
    LocationInput, PaymentIntentView, PaymentView, ReceiptResponse, ReceiptView,
    UpdateFineStatusRequest, UpdateFineStatusResponse, VehicleInput, WebhookAckResponse,
};
use crate::app::AppState;
use crate::infra::FINES_COLLECTION;
use crate::module::error::AppError;
use crate::module::user::crud as user_crud;
use crate::module::user::schema::Role;
use crate::module::violation::crud as violation_crud;
use crate::service::auth_service::Actor;
use crate::service::payment_gateway_service::{
    CreateIntentRequest, GatewayError, IntentStatus, METADATA_DRIVER_ID, METADATA_FINE_ID,
    METADATA_PLATE, METADATA_VIOLATION_CODE, amount_to_minor_units,
};
use crate::service::receipt_service;
use crate::service::validation_service::{
    validate_create_fine_request, validate_dispute_reason, validate_note_content,
};
use chrono::Utc;
use mongodb::Collection;
use mongodb::bson::{self, doc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

pub const GATEWAY_ACTOR_ID: &str = "payment-gateway";
pub const EVENT_PAYMENT_SUCCEEDED: &str = "payment_intent.succeeded";

#[derive(Debug, Default)]
pub struct FineStore {
    inner: Mutex<HashMap<String, FineRecord>>,
}

#[derive(Debug, Clone)]
struct PaymentApplication {
    payment_id: String,
    method: String,
    transaction_ref: String,
    actor_id: String,
}

enum MarkPaidOutcome {
    Applied(FineRecord),
    AlreadyPaid(FineRecord),
    NotPayable(FineStatus),
}

pub async fn create_fine(
    state: &AppState,
    actor: &Actor,
    req: CreateFineRequest,
) -> Result<CreateFineResponse, AppError> {
    if !actor.is_staff() {
        return Err(AppError::forbidden(
            "FORBIDDEN_ROLE",
            "only police officers or admins may issue fines",
        ));
    }
    validate_create_fine_request(&state.config, &req)?;

    let driver = user_crud::find_user(&state.users, &req.driver_id)?
        .ok_or_else(|| AppError::not_found("DRIVER_NOT_FOUND", "driver account not found"))?;
    if driver.role != Role::Driver {
        return Err(AppError::conflict(
            "DRIVER_ROLE_REQUIRED",
            "referenced account is not a driver",
        ));
    }
    if !driver.active {
        return Err(AppError::conflict(
            "DRIVER_INACTIVE",
            "referenced driver account is deactivated",
        ));
    }

    let violation = violation_crud::find_violation(&state.violations, &req.violation_id)?
        .ok_or_else(|| AppError::not_found("VIOLATION_NOT_FOUND", "violation not found"))?;
    if !violation.active {
        return Err(AppError::conflict(
            "VIOLATION_INACTIVE",
            "inactive violations cannot back new fines",
        ));
    }

    let amount = req.custom_amount.unwrap_or(violation.default_amount);
    let now = Utc::now().timestamp();
    let record = FineRecord {
        fine_id: format!("fine-{}", Uuid::new_v4()),
        driver_id: driver.user_id.clone(),
        issued_by: actor.id.clone(),
        violation_id: violation.violation_id.clone(),
        violation_code: violation.code.clone(),
        violation_name: violation.name.clone(),
        amount,
        currency: violation.currency,
        message: req.message.trim().to_string(),
        location: FineLocation {
            latitude: req.location.latitude,
            longitude: req.location.longitude,
            address: req.location.address.clone(),
            city: req.location.city.clone(),
            province: req.location.province.clone(),
        },
        vehicle: FineVehicle {
            plate: req.vehicle.plate.trim().to_ascii_uppercase(),
            vehicle_type: req.vehicle.vehicle_type,
            make: req.vehicle.make.clone(),
            model: req.vehicle.model.clone(),
            color: req.vehicle.color.clone(),
        },
        tags: req
            .tags
            .unwrap_or_default()
            .into_iter()
            .map(|t| t.trim().to_string())
            .collect(),
        status: FineStatus::Pending,
        issued_at: now,
        due_at: now + state.config.fine_due_days * 86_400,
        payment: None,
        dispute: None,
        notes: Vec::new(),
        transitions: vec![FineStatusTransition {
            from_status: None,
            to_status: FineStatus::Pending,
            actor_id: actor.id.clone(),
            reason: None,
            transitioned_at: now,
        }],
    };
    {
        let mut inner = lock_store(&state.fines)?;
        inner.insert(record.fine_id.clone(), record.clone());
    }
    persist_fine(state, &record).await?;

    Ok(CreateFineResponse {
        created: true,
        fine: Some(to_view(&record, now)),
        error_code: None,
        reason: "fine issued".to_string(),
    })
}

pub async fn get_fine(
    state: &AppState,
    actor: &Actor,
    fine_id: &str,
) -> Result<GetFineResponse, AppError> {
    let record = get_record(state, fine_id)?;
    authorize_view(actor, &record)?;
    Ok(GetFineResponse {
        found: true,
        fine: Some(to_view(&record, Utc::now().timestamp())),
        error_code: None,
        reason: "fine found".to_string(),
    })
}

pub async fn list_fines(
    state: &AppState,
    actor: &Actor,
    status_filter: Option<FineStatus>,
) -> Result<ListFinesResponse, AppError> {
    let now = Utc::now().timestamp();
    let mut fines = {
        let inner = lock_store(&state.fines)?;
        inner
            .values()
            .filter(|record| matches_scope(actor, record))
            .filter(|record| {
                status_filter.map_or(true, |status| record.effective_status(now) == status)
            })
            .map(|record| to_view(record, now))
            .collect::<Vec<_>>()
    };
    fines.sort_by(|a, b| b.issued_at.cmp(&a.issued_at));
    let total = fines.len();
    Ok(ListFinesResponse {
        found: total > 0,
        total,
        fines,
        error_code: None,
        reason: if total > 0 {
            "fines found".to_string()
        } else {
            "no fines match the filter".to_string()
        },
    })
}

pub async fn fines_summary(
    state: &AppState,
    actor: &Actor,
) -> Result<FinesSummaryResponse, AppError> {
    let now = Utc::now().timestamp();
    let mut pending = 0usize;
    let mut overdue = 0usize;
    let mut disputed = 0usize;
    let mut paid = 0usize;
    let mut cancelled = 0usize;
    let mut totals: HashMap<CurrencyCode, (Decimal, Decimal)> = HashMap::new();
    {
        let inner = lock_store(&state.fines)?;
        for record in inner.values().filter(|r| matches_scope(actor, r)) {
            match record.effective_status(now) {
                FineStatus::Pending => {
                    pending += 1;
                    currency_entry(&mut totals, record.currency).0 += record.amount;
                }
                FineStatus::Overdue => {
                    overdue += 1;
                    currency_entry(&mut totals, record.currency).0 += record.amount;
                }
                FineStatus::Disputed => {
                    disputed += 1;
                    currency_entry(&mut totals, record.currency).0 += record.amount;
                }
                FineStatus::Paid => {
                    paid += 1;
                    currency_entry(&mut totals, record.currency).1 += record.amount;
                }
                FineStatus::Cancelled => {
                    cancelled += 1;
                }
            }
        }
    }
    let mut by_currency = totals
        .into_iter()
        .map(|(currency, (outstanding, collected))| CurrencyTotalsView {
            currency,
            outstanding,
            collected,
        })
        .collect::<Vec<_>>();
    by_currency.sort_by(|a, b| a.currency.as_str().cmp(b.currency.as_str()));

    Ok(FinesSummaryResponse {
        total: pending + overdue + disputed + paid + cancelled,
        pending,
        overdue,
        disputed,
        paid,
        cancelled,
        by_currency,
        error_code: None,
        reason: "summary computed".to_string(),
    })
}

pub async fn update_status(
    state: &AppState,
    actor: &Actor,
    fine_id: &str,
    req: UpdateFineStatusRequest,
) -> Result<UpdateFineStatusResponse, AppError> {
    let now = Utc::now().timestamp();
    let (record, idempotent) = {
        let mut inner = lock_store(&state.fines)?;
        let record = inner
            .get_mut(fine_id)
            .ok_or_else(|| AppError::not_found("FINE_NOT_FOUND", "fine not found"))?;
        heal_overdue(record, now);
        let current = record.status;

        match actor.role {
            Role::Driver => {
                if record.driver_id != actor.id {
                    return Err(AppError::forbidden(
                        "NOT_FINE_OWNER",
                        "drivers may only act on their own fines",
                    ));
                }
                if req.next_status != FineStatus::Disputed {
                    return Err(AppError::forbidden(
                        "DRIVER_STATUS_RESTRICTED",
                        "drivers may only dispute their fines",
                    ));
                }
            }
            Role::PoliceOfficer => {
                if record.issued_by != actor.id {
                    return Err(AppError::forbidden(
                        "NOT_ISSUING_OFFICER",
                        "only the issuing officer or an admin may change this fine",
                    ));
                }
            }
            Role::Admin => {}
        }

        if req.next_status == current {
            (record.clone(), true)
        } else {
            if current == FineStatus::Paid {
                return Err(AppError::conflict(
                    "FINE_ALREADY_PAID",
                    "paid fines cannot change status",
                ));
            }
            if req.next_status == FineStatus::Disputed
                && actor.role == Role::Driver
                && !matches!(current, FineStatus::Pending | FineStatus::Overdue)
            {
                return Err(AppError::conflict(
                    "INVALID_STATE_TRANSITION",
                    format!("fine in status {} cannot be disputed", current.as_str()),
                ));
            }

            match req.next_status {
                FineStatus::Disputed => {
                    let reason = req
                        .reason
                        .as_deref()
                        .map(str::trim)
                        .filter(|r| !r.is_empty())
                        .ok_or_else(|| {
                            AppError::bad_request(
                                "INVALID_DISPUTE_REASON",
                                "a reason is required when disputing a fine",
                            )
                        })?;
                    validate_dispute_reason(&state.config, reason)?;
                    record.dispute = Some(DisputeRecord {
                        reason: reason.to_string(),
                        raised_by: actor.id.clone(),
                        raised_at: now,
                        resolution: DisputeResolution::Pending,
                        resolved_by: None,
                        resolved_at: None,
                    });
                }
                FineStatus::Paid => {
                    let payment_id = format!("manual-{}", Uuid::new_v4());
                    record.payment = Some(PaymentRecord {
                        payment_id: payment_id.clone(),
                        method: "manual".to_string(),
                        transaction_ref: payment_id,
                        receipt_number: receipt_service::receipt_number(&record.fine_id),
                        paid_at: now,
                    });
                }
                _ => {}
            }

            if current == FineStatus::Disputed {
                if let Some(dispute) = record.dispute.as_mut() {
                    dispute.resolution = if req.next_status == FineStatus::Cancelled {
                        DisputeResolution::Accepted
                    } else {
                        DisputeResolution::Rejected
                    };
                    dispute.resolved_by = Some(actor.id.clone());
                    dispute.resolved_at = Some(now);
                }
            }

            apply_transition(record, Some(current), req.next_status, &actor.id, &req.reason, now);
            (record.clone(), false)
        }
    };
    persist_fine(state, &record).await?;

    Ok(UpdateFineStatusResponse {
        updated: true,
        idempotent,
        fine: Some(to_view(&record, now)),
        error_code: None,
        reason: if idempotent {
            "status unchanged".to_string()
        } else {
            "status updated".to_string()
        },
    })
}

pub async fn add_note(
    state: &AppState,
    actor: &Actor,
    fine_id: &str,
    req: AddFineNoteRequest,
) -> Result<AddFineNoteResponse, AppError> {
    if !actor.is_staff() {
        return Err(AppError::forbidden(
            "FORBIDDEN_ROLE",
            "only staff may annotate fines",
        ));
    }
    validate_note_content(&state.config, &req.content)?;

    let now = Utc::now().timestamp();
    let (record, note) = {
        let mut inner = lock_store(&state.fines)?;
        let record = inner
            .get_mut(fine_id)
            .ok_or_else(|| AppError::not_found("FINE_NOT_FOUND", "fine not found"))?;
        heal_overdue(record, now);
        let note = FineNote {
            content: req.content.trim().to_string(),
            author_id: actor.id.clone(),
            created_at: now,
        };
        record.notes.push(note.clone());
        (record.clone(), note)
    };
    persist_fine(state, &record).await?;

    Ok(AddFineNoteResponse {
        added: true,
        note_count: record.notes.len(),
        note: Some(FineNoteView {
            content: note.content,
            author_id: note.author_id,
            created_at: note.created_at,
        }),
        error_code: None,
        reason: "note appended".to_string(),
    })
}

pub async fn create_payment_intent(
    state: &AppState,
    actor: &Actor,
    fine_id: &str,
) -> Result<CreatePaymentIntentResponse, AppError> {
    let now = Utc::now().timestamp();
    let snapshot = {
        let mut inner = lock_store(&state.fines)?;
        let record = inner
            .get_mut(fine_id)
            .ok_or_else(|| AppError::not_found("FINE_NOT_FOUND", "fine not found"))?;
        heal_overdue(record, now);
        authorize_view(actor, record)?;
        if !matches!(record.status, FineStatus::Pending | FineStatus::Overdue) {
            return Err(AppError::conflict(
                "FINE_NOT_PAYABLE",
                format!("fine in status {} cannot be paid", record.status.as_str()),
            ));
        }
        record.clone()
    };

    let amount_minor = amount_to_minor_units(snapshot.amount)
        .map_err(|e| AppError::internal("AMOUNT_CONVERSION_ERROR", e))?;
    let mut metadata = HashMap::new();
    metadata.insert(METADATA_FINE_ID.to_string(), snapshot.fine_id.clone());
    metadata.insert(METADATA_DRIVER_ID.to_string(), snapshot.driver_id.clone());
    metadata.insert(
        METADATA_VIOLATION_CODE.to_string(),
        snapshot.violation_code.clone(),
    );
    metadata.insert(METADATA_PLATE.to_string(), snapshot.vehicle.plate.clone());

    let created = state
        .gateway
        .create_intent(CreateIntentRequest {
            amount_minor,
            currency: snapshot.currency.as_str().to_string(),
            metadata,
        })
        .await
        .map_err(map_gateway_error)?;

    Ok(CreatePaymentIntentResponse {
        created: true,
        intent: Some(PaymentIntentView {
            intent_id: created.intent_id,
            client_handle: created.client_handle,
            fine_id: snapshot.fine_id,
            amount: snapshot.amount,
            currency: snapshot.currency,
            violation_name: snapshot.violation_name,
            due_at: snapshot.due_at,
        }),
        error_code: None,
        reason: "payment intent opened".to_string(),
    })
}

pub async fn confirm_payment(
    state: &AppState,
    actor: &Actor,
    fine_id: &str,
    req: ConfirmPaymentRequest,
) -> Result<ConfirmPaymentResponse, AppError> {
    let now = Utc::now().timestamp();
    {
        let mut inner = lock_store(&state.fines)?;
        let record = inner
            .get_mut(fine_id)
            .ok_or_else(|| AppError::not_found("FINE_NOT_FOUND", "fine not found"))?;
        heal_overdue(record, now);
        authorize_view(actor, record)?;
        if record.status == FineStatus::Paid {
            return Ok(ConfirmPaymentResponse {
                confirmed: true,
                idempotent: true,
                fine: Some(to_view(record, now)),
                error_code: None,
                reason: "fine already settled".to_string(),
            });
        }
        if !matches!(record.status, FineStatus::Pending | FineStatus::Overdue) {
            return Err(AppError::conflict(
                "FINE_NOT_PAYABLE",
                format!("fine in status {} cannot be paid", record.status.as_str()),
            ));
        }
    }

    let intent = state
        .gateway
        .retrieve_intent(&req.intent_id)
        .await
        .map_err(map_gateway_error)?;
    if intent.metadata.get(METADATA_FINE_ID).map(String::as_str) != Some(fine_id) {
        return Err(AppError::conflict(
            "INTENT_FINE_MISMATCH",
            "intent correlation does not reference this fine",
        ));
    }
    if intent.status != IntentStatus::Succeeded {
        return Err(AppError::conflict(
            "PAYMENT_NOT_COMPLETE",
            "gateway does not report the intent as settled",
        ));
    }

    let application = PaymentApplication {
        payment_id: intent.intent_id.clone(),
        method: intent.payment_method.unwrap_or_else(|| "card".to_string()),
        transaction_ref: intent
            .settlement_ref
            .unwrap_or_else(|| intent.intent_id.clone()),
        actor_id: actor.id.clone(),
    };
    match mark_paid(state, fine_id, application, now).await? {
        MarkPaidOutcome::Applied(record) => Ok(ConfirmPaymentResponse {
            confirmed: true,
            idempotent: false,
            fine: Some(to_view(&record, now)),
            error_code: None,
            reason: "payment settled".to_string(),
        }),
        MarkPaidOutcome::AlreadyPaid(record) => Ok(ConfirmPaymentResponse {
            confirmed: true,
            idempotent: true,
            fine: Some(to_view(&record, now)),
            error_code: None,
            reason: "fine already settled".to_string(),
        }),
        MarkPaidOutcome::NotPayable(status) => Err(AppError::conflict(
            "FINE_NOT_PAYABLE",
            format!("fine in status {} cannot be paid", status.as_str()),
        )),
    }
}

pub async fn apply_gateway_event(
    state: &AppState,
    event: GatewayWebhookEvent,
) -> Result<WebhookAckResponse, AppError> {
    if event.event_type != EVENT_PAYMENT_SUCCEEDED {
        return Ok(WebhookAckResponse {
            received: true,
            applied: false,
            idempotent: false,
            fine_id: None,
            error_code: None,
            reason: format!("event type {} ignored", event.event_type),
        });
    }
    let Some(fine_id) = event.data.metadata.get(METADATA_FINE_ID).cloned() else {
        return Ok(WebhookAckResponse {
            received: true,
            applied: false,
            idempotent: false,
            fine_id: None,
            error_code: None,
            reason: "event carries no fine correlation".to_string(),
        });
    };

    let exists = { lock_store(&state.fines)?.contains_key(&fine_id) };
    if !exists {
        return Ok(WebhookAckResponse {
            received: true,
            applied: false,
            idempotent: false,
            fine_id: Some(fine_id),
            error_code: None,
            reason: "no fine matches the event correlation".to_string(),
        });
    }

    let now = Utc::now().timestamp();
    let application = PaymentApplication {
        payment_id: event.data.intent_id.clone(),
        method: event
            .data
            .payment_method
            .clone()
            .unwrap_or_else(|| "card".to_string()),
        transaction_ref: event
            .data
            .settlement_ref
            .clone()
            .unwrap_or_else(|| event.data.intent_id.clone()),
        actor_id: GATEWAY_ACTOR_ID.to_string(),
    };
    match mark_paid(state, &fine_id, application, now).await? {
        MarkPaidOutcome::Applied(_) => Ok(WebhookAckResponse {
            received: true,
            applied: true,
            idempotent: false,
            fine_id: Some(fine_id),
            error_code: None,
            reason: "payment settled".to_string(),
        }),
        MarkPaidOutcome::AlreadyPaid(_) => Ok(WebhookAckResponse {
            received: true,
            applied: false,
            idempotent: true,
            fine_id: Some(fine_id),
            error_code: None,
            reason: "fine already settled".to_string(),
        }),
        MarkPaidOutcome::NotPayable(status) => Ok(WebhookAckResponse {
            received: true,
            applied: false,
            idempotent: false,
            fine_id: Some(fine_id),
            error_code: None,
            reason: format!("fine in status {} left untouched", status.as_str()),
        }),
    }
}

pub async fn get_receipt(
    state: &AppState,
    actor: &Actor,
    fine_id: &str,
) -> Result<ReceiptResponse, AppError> {
    let record = get_record(state, fine_id)?;
    authorize_view(actor, &record)?;
    let now = Utc::now().timestamp();
    if record.effective_status(now) != FineStatus::Paid {
        return Err(AppError::conflict(
            "RECEIPT_NOT_AVAILABLE",
            "receipts are only available for paid fines",
        ));
    }
    let payment = record.payment.as_ref().ok_or_else(|| {
        AppError::internal("PAYMENT_STATE_ERROR", "paid fine missing payment metadata")
    })?;

    Ok(ReceiptResponse {
        available: true,
        receipt: Some(ReceiptView {
            receipt_number: payment.receipt_number.clone(),
            fine_id: record.fine_id.clone(),
            driver_id: record.driver_id.clone(),
            violation_code: record.violation_code.clone(),
            violation_name: record.violation_name.clone(),
            plate: record.vehicle.plate.clone(),
            amount: record.amount,
            currency: record.currency,
            payment_method: payment.method.clone(),
            transaction_ref: payment.transaction_ref.clone(),
            paid_at: payment.paid_at,
            issued_at: record.issued_at,
        }),
        error_code: None,
        reason: "receipt composed".to_string(),
    })
}

async fn mark_paid(
    state: &AppState,
    fine_id: &str,
    application: PaymentApplication,
    now: i64,
) -> Result<MarkPaidOutcome, AppError> {
    let outcome = {
        let mut inner = lock_store(&state.fines)?;
        let record = inner
            .get_mut(fine_id)
            .ok_or_else(|| AppError::not_found("FINE_NOT_FOUND", "fine not found"))?;
        heal_overdue(record, now);
        match record.status {
            FineStatus::Paid => MarkPaidOutcome::AlreadyPaid(record.clone()),
            FineStatus::Pending | FineStatus::Overdue => {
                let previous = record.status;
                record.payment = Some(PaymentRecord {
                    payment_id: application.payment_id.clone(),
                    method: application.method.clone(),
                    transaction_ref: application.transaction_ref.clone(),
                    receipt_number: receipt_service::receipt_number(&record.fine_id),
                    paid_at: now,
                });
                apply_transition(
                    record,
                    Some(previous),
                    FineStatus::Paid,
                    &application.actor_id,
                    &Some(format!(
                        "payment settled via intent {}",
                        application.payment_id
                    )),
                    now,
                );
                MarkPaidOutcome::Applied(record.clone())
            }
            other => MarkPaidOutcome::NotPayable(other),
        }
    };
    if let MarkPaidOutcome::Applied(record) = &outcome {
        persist_fine_paid(state, record).await?;
    }
    Ok(outcome)
}

fn apply_transition(
    record: &mut FineRecord,
    from: Option<FineStatus>,
    to: FineStatus,
    actor_id: &str,
    reason: &Option<String>,
    now: i64,
) {
    record.status = to;
    record.transitions.push(FineStatusTransition {
        from_status: from,
        to_status: to,
        actor_id: actor_id.to_string(),
        reason: reason.clone(),
        transitioned_at: now,
    });
    let from_str = from.map(|s| s.as_str()).unwrap_or("NONE");
    let content = match reason {
        Some(r) => format!("status changed from {} to {}: {}", from_str, to.as_str(), r),
        None => format!("status changed from {} to {}", from_str, to.as_str()),
    };
    record.notes.push(FineNote {
        content,
        author_id: actor_id.to_string(),
        created_at: now,
    });
}

fn currency_entry(
    totals: &mut HashMap<CurrencyCode, (Decimal, Decimal)>,
    currency: CurrencyCode,
) -> &mut (Decimal, Decimal) {
    totals.entry(currency).or_insert((Decimal::ZERO, Decimal::ZERO))
}

fn heal_overdue(record: &mut FineRecord, now: i64) {
    record.status = record.effective_status(now);
}

fn matches_scope(actor: &Actor, record: &FineRecord) -> bool {
    match actor.role {
        Role::Driver => record.driver_id == actor.id,
        Role::PoliceOfficer => record.issued_by == actor.id,
        Role::Admin => true,
    }
}

fn authorize_view(actor: &Actor, record: &FineRecord) -> Result<(), AppError> {
    if actor.role == Role::Driver && record.driver_id != actor.id {
        return Err(AppError::forbidden(
            "NOT_FINE_OWNER",
            "drivers may only act on their own fines",
        ));
    }
    Ok(())
}

fn get_record(state: &AppState, fine_id: &str) -> Result<FineRecord, AppError> {
    let inner = lock_store(&state.fines)?;
    inner
        .get(fine_id)
        .cloned()
        .ok_or_else(|| AppError::not_found("FINE_NOT_FOUND", "fine not found"))
}

fn map_gateway_error(err: GatewayError) -> AppError {
    match err {
        GatewayError::Unavailable(msg) => {
            AppError::unavailable("PAYMENT_GATEWAY_UNAVAILABLE", msg)
        }
        GatewayError::Rejected(msg) => AppError::internal("PAYMENT_GATEWAY_ERROR", msg),
    }
}

fn to_view(record: &FineRecord, now: i64) -> FineView {
    FineView {
        fine_id: record.fine_id.clone(),
        driver_id: record.driver_id.clone(),
        issued_by: record.issued_by.clone(),
        violation_id: record.violation_id.clone(),
        violation_code: record.violation_code.clone(),
        violation_name: record.violation_name.clone(),
        amount: record.amount,
        currency: record.currency,
        message: record.message.clone(),
        location: LocationInput {
            latitude: record.location.latitude,
            longitude: record.location.longitude,
            address: record.location.address.clone(),
            city: record.location.city.clone(),
            province: record.location.province.clone(),
        },
        vehicle: VehicleInput {
            plate: record.vehicle.plate.clone(),
            vehicle_type: record.vehicle.vehicle_type,
            make: record.vehicle.make.clone(),
            model: record.vehicle.model.clone(),
            color: record.vehicle.color.clone(),
        },
        tags: record.tags.clone(),
        status: record.effective_status(now),
        issued_at: record.issued_at,
        due_at: record.due_at,
        payment: record.payment.as_ref().map(|p| PaymentView {
            payment_id: p.payment_id.clone(),
            method: p.method.clone(),
            transaction_ref: p.transaction_ref.clone(),
            receipt_number: p.receipt_number.clone(),
            paid_at: p.paid_at,
        }),
        dispute: record.dispute.as_ref().map(|d| DisputeView {
            reason: d.reason.clone(),
            raised_by: d.raised_by.clone(),
            raised_at: d.raised_at,
            resolution: d.resolution,
            resolved_by: d.resolved_by.clone(),
            resolved_at: d.resolved_at,
        }),
        notes: record
            .notes
            .iter()
            .map(|n| FineNoteView {
                content: n.content.clone(),
                author_id: n.author_id.clone(),
                created_at: n.created_at,
            })
            .collect(),
        transitions: record
            .transitions
            .iter()
            .map(|t| FineStatusTransitionView {
                from_status: t.from_status,
                to_status: t.to_status,
                actor_id: t.actor_id.clone(),
                reason: t.reason.clone(),
                transitioned_at: t.transitioned_at,
            })
            .collect(),
    }
}

fn lock_store(store: &FineStore) -> Result<MutexGuard<'_, HashMap<String, FineRecord>>, AppError> {
    store
        .inner
        .lock()
        .map_err(|_| AppError::internal("STORE_LOCK_ERROR", "fine store lock poisoned"))
}

async fn persist_fine(state: &AppState, record: &FineRecord) -> Result<(), AppError> {
    let Some(infra) = &state.infra else {
        return Ok(());
    };
    let fines: Collection<FineRecord> = infra.mongo_db.collection(FINES_COLLECTION);
    fines
        .replace_one(doc! { "fine_id": &record.fine_id }, record.clone())
        .upsert(true)
        .await
        .map_err(|e| AppError::internal("PERSISTENCE_ERROR", format!("fine upsert failed: {e}")))?;
    Ok(())
}

async fn persist_fine_paid(state: &AppState, record: &FineRecord) -> Result<(), AppError> {
    let Some(infra) = &state.infra else {
        return Ok(());
    };
    let fines: Collection<FineRecord> = infra.mongo_db.collection(FINES_COLLECTION);
    let payment = bson::to_bson(&record.payment)
        .map_err(|e| AppError::internal("SERIALIZATION_ERROR", e.to_string()))?;
    let notes = bson::to_bson(&record.notes)
        .map_err(|e| AppError::internal("SERIALIZATION_ERROR", e.to_string()))?;
    let transitions = bson::to_bson(&record.transitions)
        .map_err(|e| AppError::internal("SERIALIZATION_ERROR", e.to_string()))?;
    fines
        .update_one(
            doc! {
                "fine_id": &record.fine_id,
                "status": { "$in": ["PENDING", "OVERDUE"] },
            },
            doc! {
                "$set": {
                    "status": "PAID",
                    "payment": payment,
                    "notes": notes,
                    "transitions": transitions,
                }
            },
        )
        .await
        .map_err(|e| {
            AppError::internal("PERSISTENCE_ERROR", format!("paid transition failed: {e}"))
        })?;
    Ok(())
}
