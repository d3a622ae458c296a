mod common;

use common::*;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use traffic_fine_api::module::fine::schema::{
    ConfirmPaymentRequest, ConfirmPaymentResponse, CreatePaymentIntentResponse, CurrencyCode,
    FineStatus, FineView, GatewayEventData, GatewayWebhookEvent, GetFineResponse,
    PaymentIntentView, ReceiptResponse, UpdateFineStatusRequest, UpdateFineStatusResponse,
    WebhookAckResponse,
};
use traffic_fine_api::module::user::schema::Role;

async fn open_intent(ctx: &TestContext, token: &str, fine_id: &str) -> PaymentIntentView {
    let (status, body): (_, CreatePaymentIntentResponse) = post_json(
        &ctx.app,
        &format!("/v1/fines/{fine_id}/payment-intent"),
        Some(token),
        &serde_json::json!({}),
    )
    .await;
    assert_eq!(status, http::StatusCode::OK, "open intent failed: {}", body.reason);
    body.intent.expect("intent")
}

async fn confirm(
    ctx: &TestContext,
    token: &str,
    fine_id: &str,
    intent_id: &str,
) -> (http::StatusCode, ConfirmPaymentResponse) {
    post_json(
        &ctx.app,
        &format!("/v1/fines/{fine_id}/payment-confirm"),
        Some(token),
        &ConfirmPaymentRequest {
            intent_id: intent_id.to_string(),
        },
    )
    .await
}

async fn fetch_fine(ctx: &TestContext, token: &str, fine_id: &str) -> FineView {
    let (status, body): (_, GetFineResponse) =
        get_json(&ctx.app, &format!("/v1/fines/{fine_id}"), Some(token)).await;
    assert_eq!(status, http::StatusCode::OK);
    body.fine.expect("fine")
}

fn succeeded_event(fine_id: &str, intent_id: &str) -> GatewayWebhookEvent {
    let mut metadata = HashMap::new();
    metadata.insert("fine_id".to_string(), fine_id.to_string());
    GatewayWebhookEvent {
        event_id: format!("evt-{intent_id}"),
        event_type: "payment_intent.succeeded".to_string(),
        created_at: None,
        data: GatewayEventData {
            intent_id: intent_id.to_string(),
            status: Some("SUCCEEDED".to_string()),
            payment_method: Some("card".to_string()),
            settlement_ref: Some(format!("ch-{intent_id}")),
            metadata,
        },
    }
}

#[tokio::test]
async fn opening_an_intent_returns_a_snapshot_without_mutating_the_fine() {
    let ctx = build_test_context();
    let driver_id = seed_driver(&ctx, "Nuwan Rajapaksa").await;
    let violation_id = seed_violation(&ctx, "PY001", dec!(2500)).await;
    let fine = issue_fine(&ctx, &driver_id, &violation_id, None).await;

    let driver = token_for(&ctx.config, &driver_id, Role::Driver);
    let intent = open_intent(&ctx, &driver, &fine.fine_id).await;

    assert!(!intent.intent_id.is_empty());
    assert!(!intent.client_handle.is_empty());
    assert_eq!(intent.amount, dec!(2500));
    assert_eq!(intent.currency, CurrencyCode::Lkr);
    assert_eq!(intent.due_at, fine.due_at);

    let seeded = ctx.gateway.intent(&intent.intent_id).expect("gateway intent");
    assert_eq!(seeded.amount_minor, 250_000);
    assert_eq!(seeded.currency, "LKR");
    assert_eq!(
        seeded.metadata.get("fine_id").map(String::as_str),
        Some(fine.fine_id.as_str())
    );
    assert_eq!(
        seeded.metadata.get("plate").map(String::as_str),
        Some("CAB-1234")
    );

    let unchanged = fetch_fine(&ctx, &driver, &fine.fine_id).await;
    assert_eq!(unchanged.status, FineStatus::Pending);
    assert!(unchanged.payment.is_none());
    assert!(unchanged.notes.is_empty());
}

#[tokio::test]
async fn a_driver_cannot_open_an_intent_for_a_foreign_fine() {
    let ctx = build_test_context();
    let owner = seed_driver(&ctx, "Sampath Liyanage").await;
    let other = seed_driver(&ctx, "Gayan Mendis").await;
    let violation_id = seed_violation(&ctx, "PY002", dec!(2500)).await;
    let fine = issue_fine(&ctx, &owner, &violation_id, None).await;

    let intruder = token_for(&ctx.config, &other, Role::Driver);
    let (status, body): (_, CreatePaymentIntentResponse) = post_json(
        &ctx.app,
        &format!("/v1/fines/{}/payment-intent", fine.fine_id),
        Some(&intruder),
        &serde_json::json!({}),
    )
    .await;

    assert_eq!(status, http::StatusCode::FORBIDDEN);
    assert_eq!(body.error_code.as_deref(), Some("NOT_FINE_OWNER"));
}

#[tokio::test]
async fn a_cancelled_fine_cannot_open_an_intent() {
    let ctx = build_test_context();
    let driver_id = seed_driver(&ctx, "Upul Karunaratne").await;
    let violation_id = seed_violation(&ctx, "PY003", dec!(2500)).await;
    let fine = issue_fine(&ctx, &driver_id, &violation_id, None).await;

    let admin = admin_token(&ctx);
    let cancel = UpdateFineStatusRequest {
        next_status: FineStatus::Cancelled,
        reason: Some("withdrawn".to_string()),
    };
    let (_, _resp): (_, UpdateFineStatusResponse) = post_json(
        &ctx.app,
        &format!("/v1/fines/{}/status", fine.fine_id),
        Some(&admin),
        &cancel,
    )
    .await;

    let driver = token_for(&ctx.config, &driver_id, Role::Driver);
    let (status, body): (_, CreatePaymentIntentResponse) = post_json(
        &ctx.app,
        &format!("/v1/fines/{}/payment-intent", fine.fine_id),
        Some(&driver),
        &serde_json::json!({}),
    )
    .await;

    assert_eq!(status, http::StatusCode::CONFLICT);
    assert_eq!(body.error_code.as_deref(), Some("FINE_NOT_PAYABLE"));
}

#[tokio::test]
async fn confirming_a_settled_intent_marks_the_fine_paid() {
    let ctx = build_test_context();
    let driver_id = seed_driver(&ctx, "Sachith Pathirana").await;
    let violation_id = seed_violation(&ctx, "PY004", dec!(2500)).await;
    let fine = issue_fine(&ctx, &driver_id, &violation_id, None).await;

    let driver = token_for(&ctx.config, &driver_id, Role::Driver);
    let intent = open_intent(&ctx, &driver, &fine.fine_id).await;
    ctx.gateway.settle_intent(&intent.intent_id);

    let (status, body) = confirm(&ctx, &driver, &fine.fine_id, &intent.intent_id).await;
    assert_eq!(status, http::StatusCode::OK);
    assert!(body.confirmed);
    assert!(!body.idempotent);

    let paid = body.fine.expect("fine");
    assert_eq!(paid.status, FineStatus::Paid);
    let payment = paid.payment.expect("payment metadata");
    assert_eq!(payment.payment_id, intent.intent_id);
    assert_eq!(payment.method, "card");
    assert_eq!(payment.transaction_ref, format!("ch-{}", intent.intent_id));
    assert!(payment.receipt_number.starts_with("RCPT-"));
    assert!(payment.paid_at > 0);
    assert_eq!(paid.notes.len(), 1);
    assert_eq!(
        paid.transitions.last().expect("transition").to_status,
        FineStatus::Paid
    );
}

#[tokio::test]
async fn confirming_before_settlement_fails_and_leaves_the_fine_pending() {
    let ctx = build_test_context();
    let driver_id = seed_driver(&ctx, "Buddhika Siriwardena").await;
    let violation_id = seed_violation(&ctx, "PY005", dec!(2500)).await;
    let fine = issue_fine(&ctx, &driver_id, &violation_id, None).await;

    let driver = token_for(&ctx.config, &driver_id, Role::Driver);
    let intent = open_intent(&ctx, &driver, &fine.fine_id).await;

    let (status, body) = confirm(&ctx, &driver, &fine.fine_id, &intent.intent_id).await;
    assert_eq!(status, http::StatusCode::CONFLICT);
    assert_eq!(body.error_code.as_deref(), Some("PAYMENT_NOT_COMPLETE"));

    let unchanged = fetch_fine(&ctx, &driver, &fine.fine_id).await;
    assert_eq!(unchanged.status, FineStatus::Pending);
    assert!(unchanged.payment.is_none());
}

#[tokio::test]
async fn confirming_with_an_intent_for_another_fine_is_a_mismatch() {
    let ctx = build_test_context();
    let driver_id = seed_driver(&ctx, "Hasitha Abeysekera").await;
    let violation_id = seed_violation(&ctx, "PY006", dec!(2500)).await;
    let target = issue_fine(&ctx, &driver_id, &violation_id, None).await;
    let other = issue_fine(&ctx, &driver_id, &violation_id, None).await;

    let driver = token_for(&ctx.config, &driver_id, Role::Driver);
    let foreign_intent = open_intent(&ctx, &driver, &other.fine_id).await;
    ctx.gateway.settle_intent(&foreign_intent.intent_id);

    let (status, body) = confirm(&ctx, &driver, &target.fine_id, &foreign_intent.intent_id).await;
    assert_eq!(status, http::StatusCode::CONFLICT);
    assert_eq!(body.error_code.as_deref(), Some("INTENT_FINE_MISMATCH"));

    let unchanged = fetch_fine(&ctx, &driver, &target.fine_id).await;
    assert_eq!(unchanged.status, FineStatus::Pending);
    assert!(unchanged.payment.is_none());
}

#[tokio::test]
async fn confirming_twice_is_idempotent() {
    let ctx = build_test_context();
    let driver_id = seed_driver(&ctx, "Charith Munasinghe").await;
    let violation_id = seed_violation(&ctx, "PY007", dec!(2500)).await;
    let fine = issue_fine(&ctx, &driver_id, &violation_id, None).await;

    let driver = token_for(&ctx.config, &driver_id, Role::Driver);
    let intent = open_intent(&ctx, &driver, &fine.fine_id).await;
    ctx.gateway.settle_intent(&intent.intent_id);

    let (_, first) = confirm(&ctx, &driver, &fine.fine_id, &intent.intent_id).await;
    let first_fine = first.fine.expect("fine");
    let first_payment = first_fine.payment.clone().expect("payment");

    let (status, second) = confirm(&ctx, &driver, &fine.fine_id, &intent.intent_id).await;
    assert_eq!(status, http::StatusCode::OK);
    assert!(second.confirmed);
    assert!(second.idempotent);

    let second_fine = second.fine.expect("fine");
    let second_payment = second_fine.payment.expect("payment");
    assert_eq!(second_payment.paid_at, first_payment.paid_at);
    assert_eq!(second_payment.payment_id, first_payment.payment_id);
    assert_eq!(second_fine.notes.len(), first_fine.notes.len());
    assert_eq!(second_fine.transitions.len(), first_fine.transitions.len());
}

#[tokio::test]
async fn gateway_outage_surfaces_as_a_retryable_failure() {
    let ctx = build_test_context();
    let driver_id = seed_driver(&ctx, "Vimukthi Ellawala").await;
    let violation_id = seed_violation(&ctx, "PY008", dec!(2500)).await;
    let fine = issue_fine(&ctx, &driver_id, &violation_id, None).await;

    let driver = token_for(&ctx.config, &driver_id, Role::Driver);
    ctx.gateway.set_unavailable(true);
    let (status, body): (_, CreatePaymentIntentResponse) = post_json(
        &ctx.app,
        &format!("/v1/fines/{}/payment-intent", fine.fine_id),
        Some(&driver),
        &serde_json::json!({}),
    )
    .await;

    assert_eq!(status, http::StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        body.error_code.as_deref(),
        Some("PAYMENT_GATEWAY_UNAVAILABLE")
    );
}

#[tokio::test]
async fn a_verified_webhook_settles_a_pending_fine() {
    let ctx = build_test_context();
    let driver_id = seed_driver(&ctx, "Dinesh Chandimal").await;
    let violation_id = seed_violation(&ctx, "PY009", dec!(2500)).await;
    let fine = issue_fine(&ctx, &driver_id, &violation_id, None).await;

    let event = succeeded_event(&fine.fine_id, "pi-webhook-1");
    let payload = serde_json::to_vec(&event).expect("serialize event");
    let signature = webhook_signature(&payload);

    let (status, body): (_, WebhookAckResponse) =
        post_webhook(&ctx.app, &payload, Some(&signature)).await;
    assert_eq!(status, http::StatusCode::OK);
    assert!(body.received);
    assert!(body.applied);

    let driver = token_for(&ctx.config, &driver_id, Role::Driver);
    let paid = fetch_fine(&ctx, &driver, &fine.fine_id).await;
    assert_eq!(paid.status, FineStatus::Paid);
    assert_eq!(
        paid.payment.expect("payment").payment_id,
        "pi-webhook-1".to_string()
    );
}

#[tokio::test]
async fn webhooks_fail_closed_on_signature_problems() {
    let ctx = build_test_context();
    let driver_id = seed_driver(&ctx, "Angelo Perera").await;
    let violation_id = seed_violation(&ctx, "PY010", dec!(2500)).await;
    let fine = issue_fine(&ctx, &driver_id, &violation_id, None).await;

    let event = succeeded_event(&fine.fine_id, "pi-webhook-2");
    let payload = serde_json::to_vec(&event).expect("serialize event");

    let (status, body): (_, WebhookAckResponse) = post_webhook(&ctx.app, &payload, None).await;
    assert_eq!(status, http::StatusCode::UNAUTHORIZED);
    assert_eq!(body.error_code.as_deref(), Some("MISSING_WEBHOOK_SIGNATURE"));

    let tampered = webhook_signature(b"some other payload");
    let (status, body): (_, WebhookAckResponse) =
        post_webhook(&ctx.app, &payload, Some(&tampered)).await;
    assert_eq!(status, http::StatusCode::UNAUTHORIZED);
    assert_eq!(body.error_code.as_deref(), Some("INVALID_WEBHOOK_SIGNATURE"));

    let driver = token_for(&ctx.config, &driver_id, Role::Driver);
    let unchanged = fetch_fine(&ctx, &driver, &fine.fine_id).await;
    assert_eq!(unchanged.status, FineStatus::Pending);
}

#[tokio::test]
async fn webhook_redelivery_for_a_paid_fine_is_a_noop() {
    let ctx = build_test_context();
    let driver_id = seed_driver(&ctx, "Kusal Jayasundara").await;
    let violation_id = seed_violation(&ctx, "PY011", dec!(2500)).await;
    let fine = issue_fine(&ctx, &driver_id, &violation_id, None).await;

    let driver = token_for(&ctx.config, &driver_id, Role::Driver);
    let intent = open_intent(&ctx, &driver, &fine.fine_id).await;
    ctx.gateway.settle_intent(&intent.intent_id);
    let (_, confirmed) = confirm(&ctx, &driver, &fine.fine_id, &intent.intent_id).await;
    let confirmed_fine = confirmed.fine.expect("fine");

    let event = succeeded_event(&fine.fine_id, &intent.intent_id);
    let payload = serde_json::to_vec(&event).expect("serialize event");
    let signature = webhook_signature(&payload);
    let (status, body): (_, WebhookAckResponse) =
        post_webhook(&ctx.app, &payload, Some(&signature)).await;

    assert_eq!(status, http::StatusCode::OK);
    assert!(body.received);
    assert!(!body.applied);
    assert!(body.idempotent);

    let after = fetch_fine(&ctx, &driver, &fine.fine_id).await;
    assert_eq!(after.notes.len(), confirmed_fine.notes.len());
    assert_eq!(
        after.payment.expect("payment").paid_at,
        confirmed_fine.payment.expect("payment").paid_at
    );
}

#[tokio::test]
async fn unknown_webhook_event_types_are_accepted_and_ignored() {
    let ctx = build_test_context();

    let mut event = succeeded_event("fine-unknown", "pi-webhook-3");
    event.event_type = "payment_intent.created".to_string();
    let payload = serde_json::to_vec(&event).expect("serialize event");
    let signature = webhook_signature(&payload);

    let (status, body): (_, WebhookAckResponse) =
        post_webhook(&ctx.app, &payload, Some(&signature)).await;
    assert_eq!(status, http::StatusCode::OK);
    assert!(body.received);
    assert!(!body.applied);
}

#[tokio::test]
async fn webhook_for_an_unknown_fine_is_accepted_without_effect() {
    let ctx = build_test_context();

    let event = succeeded_event("fine-missing", "pi-webhook-4");
    let payload = serde_json::to_vec(&event).expect("serialize event");
    let signature = webhook_signature(&payload);

    let (status, body): (_, WebhookAckResponse) =
        post_webhook(&ctx.app, &payload, Some(&signature)).await;
    assert_eq!(status, http::StatusCode::OK);
    assert!(body.received);
    assert!(!body.applied);
}

#[tokio::test]
async fn receipts_exist_only_for_paid_fines() {
    let ctx = build_test_context();
    let driver_id = seed_driver(&ctx, "Thisara Wanigasekara").await;
    let violation_id = seed_violation(&ctx, "PY012", dec!(2500)).await;
    let fine = issue_fine(&ctx, &driver_id, &violation_id, None).await;
    let driver = token_for(&ctx.config, &driver_id, Role::Driver);

    let (status, body): (_, ReceiptResponse) = get_json(
        &ctx.app,
        &format!("/v1/fines/{}/receipt", fine.fine_id),
        Some(&driver),
    )
    .await;
    assert_eq!(status, http::StatusCode::CONFLICT);
    assert_eq!(body.error_code.as_deref(), Some("RECEIPT_NOT_AVAILABLE"));

    let intent = open_intent(&ctx, &driver, &fine.fine_id).await;
    ctx.gateway.settle_intent(&intent.intent_id);
    let (_, confirmed) = confirm(&ctx, &driver, &fine.fine_id, &intent.intent_id).await;
    let payment = confirmed.fine.expect("fine").payment.expect("payment");

    let (status, body): (_, ReceiptResponse) = get_json(
        &ctx.app,
        &format!("/v1/fines/{}/receipt", fine.fine_id),
        Some(&driver),
    )
    .await;
    assert_eq!(status, http::StatusCode::OK);
    let receipt = body.receipt.expect("receipt");
    assert_eq!(receipt.receipt_number, payment.receipt_number);
    assert_eq!(receipt.amount, dec!(2500));
    assert_eq!(receipt.currency, CurrencyCode::Lkr);
    assert_eq!(receipt.violation_code, "PY012");
}

#[tokio::test]
async fn a_manual_paid_override_still_satisfies_the_payment_invariant() {
    let ctx = build_test_context();
    let driver_id = seed_driver(&ctx, "Suranga Lakmal").await;
    let violation_id = seed_violation(&ctx, "PY013", dec!(2500)).await;
    let fine = issue_fine(&ctx, &driver_id, &violation_id, None).await;

    let admin = admin_token(&ctx);
    let req = UpdateFineStatusRequest {
        next_status: FineStatus::Paid,
        reason: Some("settled in cash at the station".to_string()),
    };
    let (status, body): (_, UpdateFineStatusResponse) = post_json(
        &ctx.app,
        &format!("/v1/fines/{}/status", fine.fine_id),
        Some(&admin),
        &req,
    )
    .await;

    assert_eq!(status, http::StatusCode::OK);
    let paid = body.fine.expect("fine");
    assert_eq!(paid.status, FineStatus::Paid);
    let payment = paid.payment.expect("payment");
    assert_eq!(payment.method, "manual");
    assert!(payment.payment_id.starts_with("manual-"));
    assert!(payment.receipt_number.starts_with("RCPT-"));

    let driver = token_for(&ctx.config, &driver_id, Role::Driver);
    let (status, body): (_, ReceiptResponse) = get_json(
        &ctx.app,
        &format!("/v1/fines/{}/receipt", fine.fine_id),
        Some(&driver),
    )
    .await;
    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(
        body.receipt.expect("receipt").receipt_number,
        payment.receipt_number
    );
}
