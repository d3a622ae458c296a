#![allow(dead_code)]

use async_trait::async_trait;
use http::Request;
use rust_decimal::Decimal;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tower::util::ServiceExt;
use traffic_fine_api::app::{AppState, build_router};
use traffic_fine_api::config::environment::AppConfig;
use traffic_fine_api::module::fine::schema::{
    CreateFineRequest, CreateFineResponse, FineView, LocationInput, VehicleInput, VehicleType,
};
use traffic_fine_api::module::user::schema::{CreateUserRequest, CreateUserResponse, Role};
use traffic_fine_api::module::violation::schema::{
    CreateViolationRequest, CreateViolationResponse, ViolationCategory, ViolationSeverity,
};
use traffic_fine_api::service::auth_service::issue_access_token;
use traffic_fine_api::service::payment_gateway_service::{
    CreateIntentRequest, CreatedIntent, GatewayError, IntentDetails, IntentStatus, PaymentGateway,
};
use traffic_fine_api::service::webhook_signature_service::sign_webhook_payload;

pub const ADMIN_ID: &str = "usr-admin-1";
pub const OFFICER_ID: &str = "usr-officer-1";
pub const WEBHOOK_SECRET: &str = "whsec-test";

pub struct TestContext {
    pub app: axum::Router,
    pub gateway: Arc<StubGateway>,
    pub config: AppConfig,
}

pub fn test_config() -> AppConfig {
    AppConfig {
        rust_env: "test".to_string(),
        api_host: "127.0.0.1".to_string(),
        api_port: 0,
        mongodb_url: None,
        mongodb_database: None,
        jwt_secret: "test-jwt-secret".to_string(),
        jwt_ttl_seconds: 3600,
        auth_bootstrap_secret: Some("bootstrap-secret".to_string()),
        gateway_base_url: "http://127.0.0.1:8091".to_string(),
        gateway_api_key: None,
        gateway_webhook_secret: WEBHOOK_SECRET.to_string(),
        gateway_timeout_seconds: 5,
        fine_due_days: 30,
        fine_message_max_chars: 500,
        note_max_chars: 1000,
        tag_max_chars: 40,
        max_tags: 10,
        cors_allowed_origins: "http://localhost:3000".to_string(),
    }
}

pub fn build_test_context() -> TestContext {
    build_test_context_with(test_config())
}

pub fn build_test_context_with(config: AppConfig) -> TestContext {
    let gateway = Arc::new(StubGateway::default());
    let state = AppState::new(config.clone(), None, gateway.clone());
    TestContext {
        app: build_router(state),
        gateway,
        config,
    }
}

pub fn token_for(config: &AppConfig, user_id: &str, role: Role) -> String {
    issue_access_token(user_id, role, &config.jwt_secret, config.jwt_ttl_seconds)
        .expect("issue token")
        .0
}

pub fn admin_token(ctx: &TestContext) -> String {
    token_for(&ctx.config, ADMIN_ID, Role::Admin)
}

pub fn officer_token(ctx: &TestContext) -> String {
    token_for(&ctx.config, OFFICER_ID, Role::PoliceOfficer)
}

pub async fn post_json<B: Serialize, R: DeserializeOwned>(
    app: &axum::Router,
    uri: &str,
    token: Option<&str>,
    body: &B,
) -> (http::StatusCode, R) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = builder
        .body(axum::body::Body::from(
            serde_json::to_vec(body).expect("serialize request"),
        ))
        .expect("build request");
    send(app, request).await
}

pub async fn get_json<R: DeserializeOwned>(
    app: &axum::Router,
    uri: &str,
    token: Option<&str>,
) -> (http::StatusCode, R) {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = builder
        .body(axum::body::Body::empty())
        .expect("build request");
    send(app, request).await
}

pub async fn post_webhook<R: DeserializeOwned>(
    app: &axum::Router,
    payload: &[u8],
    signature: Option<&str>,
) -> (http::StatusCode, R) {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/v1/payments/webhook")
        .header("content-type", "application/json");
    if let Some(signature) = signature {
        builder = builder.header("x-gateway-signature", signature);
    }
    let request = builder
        .body(axum::body::Body::from(payload.to_vec()))
        .expect("build request");
    send(app, request).await
}

pub fn webhook_signature(payload: &[u8]) -> String {
    sign_webhook_payload(payload, WEBHOOK_SECRET).expect("sign payload")
}

async fn send<R: DeserializeOwned>(
    app: &axum::Router,
    request: Request<axum::body::Body>,
) -> (http::StatusCode, R) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let payload: R = serde_json::from_slice(&body).expect("deserialize response");
    (status, payload)
}

pub async fn seed_user(ctx: &TestContext, full_name: &str, role: Role) -> String {
    let token = admin_token(ctx);
    let req = CreateUserRequest {
        full_name: full_name.to_string(),
        role,
        license_number: if role == Role::Driver {
            Some(format!("B{:07}", full_name.len()))
        } else {
            None
        },
    };
    let (status, body): (_, CreateUserResponse) =
        post_json(&ctx.app, "/v1/users", Some(&token), &req).await;
    assert_eq!(status, http::StatusCode::OK, "seed user failed: {}", body.reason);
    body.user.expect("seeded user").user_id
}

pub async fn seed_driver(ctx: &TestContext, full_name: &str) -> String {
    seed_user(ctx, full_name, Role::Driver).await
}

pub async fn seed_violation(ctx: &TestContext, code: &str, default_amount: Decimal) -> String {
    let token = admin_token(ctx);
    let req = CreateViolationRequest {
        name: "Exceeding the speed limit".to_string(),
        code: code.to_string(),
        description: "Driving above the posted limit".to_string(),
        default_amount,
        currency: traffic_fine_api::module::fine::schema::CurrencyCode::Lkr,
        severity: ViolationSeverity::Severe,
        category: ViolationCategory::Speeding,
        points: 6,
        active: Some(true),
    };
    let (status, body): (_, CreateViolationResponse) =
        post_json(&ctx.app, "/v1/violations", Some(&token), &req).await;
    assert_eq!(
        status,
        http::StatusCode::OK,
        "seed violation failed: {}",
        body.reason
    );
    body.violation.expect("seeded violation").violation_id
}

pub fn sample_fine_request(driver_id: &str, violation_id: &str) -> CreateFineRequest {
    CreateFineRequest {
        driver_id: driver_id.to_string(),
        violation_id: violation_id.to_string(),
        message: "Clocked at 92 km/h in a 50 km/h zone".to_string(),
        custom_amount: None,
        location: LocationInput {
            latitude: 6.9271,
            longitude: 79.8612,
            address: Some("Galle Road".to_string()),
            city: Some("Colombo".to_string()),
            province: Some("Western".to_string()),
        },
        vehicle: VehicleInput {
            plate: "CAB-1234".to_string(),
            vehicle_type: VehicleType::Car,
            make: Some("Toyota".to_string()),
            model: Some("Axio".to_string()),
            color: Some("White".to_string()),
        },
        tags: None,
    }
}

pub async fn issue_fine(
    ctx: &TestContext,
    driver_id: &str,
    violation_id: &str,
    custom_amount: Option<Decimal>,
) -> FineView {
    let token = officer_token(ctx);
    let mut req = sample_fine_request(driver_id, violation_id);
    req.custom_amount = custom_amount;
    let (status, body): (_, CreateFineResponse) =
        post_json(&ctx.app, "/v1/fines", Some(&token), &req).await;
    assert_eq!(status, http::StatusCode::OK, "issue fine failed: {}", body.reason);
    body.fine.expect("issued fine")
}

#[derive(Default)]
pub struct StubGateway {
    inner: Mutex<StubGatewayInner>,
    unavailable: AtomicBool,
}

#[derive(Default)]
struct StubGatewayInner {
    intents: HashMap<String, IntentDetails>,
    counter: u64,
}

impl StubGateway {
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn settle_intent(&self, intent_id: &str) {
        let mut inner = self.inner.lock().expect("stub gateway lock");
        let intent = inner.intents.get_mut(intent_id).expect("known intent");
        intent.status = IntentStatus::Succeeded;
        intent.payment_method = Some("card".to_string());
        intent.settlement_ref = Some(format!("ch-{intent_id}"));
    }

    pub fn intent(&self, intent_id: &str) -> Option<IntentDetails> {
        self.inner
            .lock()
            .expect("stub gateway lock")
            .intents
            .get(intent_id)
            .cloned()
    }
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn create_intent(&self, req: CreateIntentRequest) -> Result<CreatedIntent, GatewayError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(GatewayError::Unavailable("stub gateway offline".to_string()));
        }
        let mut inner = self.inner.lock().expect("stub gateway lock");
        inner.counter += 1;
        let intent_id = format!("pi-{:04}", inner.counter);
        inner.intents.insert(
            intent_id.clone(),
            IntentDetails {
                intent_id: intent_id.clone(),
                status: IntentStatus::RequiresPayment,
                amount_minor: req.amount_minor,
                currency: req.currency,
                payment_method: None,
                settlement_ref: None,
                metadata: req.metadata,
            },
        );
        Ok(CreatedIntent {
            client_handle: format!("{intent_id}-secret"),
            intent_id,
        })
    }

    async fn retrieve_intent(&self, intent_id: &str) -> Result<IntentDetails, GatewayError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(GatewayError::Unavailable("stub gateway offline".to_string()));
        }
        self.inner
            .lock()
            .expect("stub gateway lock")
            .intents
            .get(intent_id)
            .cloned()
            .ok_or_else(|| GatewayError::Rejected("unknown intent".to_string()))
    }
}
