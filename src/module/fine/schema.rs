use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FineStatus {
    Pending,
    Paid,
    Disputed,
    Cancelled,
    Overdue,
}

impl FineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Paid => "PAID",
            Self::Disputed => "DISPUTED",
            Self::Cancelled => "CANCELLED",
            Self::Overdue => "OVERDUE",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Some(Self::Pending),
            "PAID" => Some(Self::Paid),
            "DISPUTED" => Some(Self::Disputed),
            "CANCELLED" => Some(Self::Cancelled),
            "OVERDUE" => Some(Self::Overdue),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurrencyCode {
    Lkr,
    Usd,
    Eur,
    Gbp,
    Inr,
}

impl CurrencyCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lkr => "LKR",
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
            Self::Inr => "INR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleType {
    Car,
    Motorcycle,
    ThreeWheeler,
    Van,
    Bus,
    Lorry,
    Other,
}

impl VehicleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Car => "CAR",
            Self::Motorcycle => "MOTORCYCLE",
            Self::ThreeWheeler => "THREE_WHEELER",
            Self::Van => "VAN",
            Self::Bus => "BUS",
            Self::Lorry => "LORRY",
            Self::Other => "OTHER",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisputeResolution {
    Pending,
    Accepted,
    Rejected,
}

impl DisputeResolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Accepted => "ACCEPTED",
            Self::Rejected => "REJECTED",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationInput {
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleInput {
    pub plate: String,
    #[serde(alias = "vehicleType")]
    pub vehicle_type: VehicleType,
    pub make: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFineRequest {
    #[serde(alias = "driverId")]
    pub driver_id: String,
    #[serde(alias = "violationId")]
    pub violation_id: String,
    pub message: String,
    #[serde(alias = "customAmount")]
    pub custom_amount: Option<Decimal>,
    pub location: LocationInput,
    pub vehicle: VehicleInput,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FineNoteView {
    pub content: String,
    pub author_id: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FineStatusTransitionView {
    pub from_status: Option<FineStatus>,
    pub to_status: FineStatus,
    pub actor_id: String,
    pub reason: Option<String>,
    pub transitioned_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentView {
    pub payment_id: String,
    pub method: String,
    pub transaction_ref: String,
    pub receipt_number: String,
    pub paid_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisputeView {
    pub reason: String,
    pub raised_by: String,
    pub raised_at: i64,
    pub resolution: DisputeResolution,
    pub resolved_by: Option<String>,
    pub resolved_at: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FineView {
    pub fine_id: String,
    pub driver_id: String,
    pub issued_by: String,
    pub violation_id: String,
    pub violation_code: String,
    pub violation_name: String,
    pub amount: Decimal,
    pub currency: CurrencyCode,
    pub message: String,
    pub location: LocationInput,
    pub vehicle: VehicleInput,
    pub tags: Vec<String>,
    pub status: FineStatus,
    pub issued_at: i64,
    pub due_at: i64,
    pub payment: Option<PaymentView>,
    pub dispute: Option<DisputeView>,
    pub notes: Vec<FineNoteView>,
    pub transitions: Vec<FineStatusTransitionView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFineResponse {
    pub created: bool,
    pub fine: Option<FineView>,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetFineResponse {
    pub found: bool,
    pub fine: Option<FineView>,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListFinesResponse {
    pub found: bool,
    pub total: usize,
    pub fines: Vec<FineView>,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyTotalsView {
    pub currency: CurrencyCode,
    pub outstanding: Decimal,
    pub collected: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinesSummaryResponse {
    pub total: usize,
    pub pending: usize,
    pub overdue: usize,
    pub disputed: usize,
    pub paid: usize,
    pub cancelled: usize,
    pub by_currency: Vec<CurrencyTotalsView>,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateFineStatusRequest {
    #[serde(alias = "nextStatus")]
    pub next_status: FineStatus,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateFineStatusResponse {
    pub updated: bool,
    pub idempotent: bool,
    pub fine: Option<FineView>,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddFineNoteRequest {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddFineNoteResponse {
    pub added: bool,
    pub note_count: usize,
    pub note: Option<FineNoteView>,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntentView {
    pub intent_id: String,
    pub client_handle: String,
    pub fine_id: String,
    pub amount: Decimal,
    pub currency: CurrencyCode,
    pub violation_name: String,
    pub due_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePaymentIntentResponse {
    pub created: bool,
    pub intent: Option<PaymentIntentView>,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmPaymentRequest {
    #[serde(alias = "intentId")]
    pub intent_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmPaymentResponse {
    pub confirmed: bool,
    pub idempotent: bool,
    pub fine: Option<FineView>,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayEventData {
    #[serde(alias = "intentId")]
    pub intent_id: String,
    pub status: Option<String>,
    #[serde(alias = "paymentMethod")]
    pub payment_method: Option<String>,
    #[serde(alias = "settlementRef")]
    pub settlement_ref: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayWebhookEvent {
    #[serde(alias = "eventId")]
    pub event_id: String,
    #[serde(alias = "eventType")]
    pub event_type: String,
    #[serde(alias = "createdAt")]
    pub created_at: Option<i64>,
    pub data: GatewayEventData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAckResponse {
    pub received: bool,
    pub applied: bool,
    pub idempotent: bool,
    pub fine_id: Option<String>,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptView {
    pub receipt_number: String,
    pub fine_id: String,
    pub driver_id: String,
    pub violation_code: String,
    pub violation_name: String,
    pub plate: String,
    pub amount: Decimal,
    pub currency: CurrencyCode,
    pub payment_method: String,
    pub transaction_ref: String,
    pub paid_at: i64,
    pub issued_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptResponse {
    pub available: bool,
    pub receipt: Option<ReceiptView>,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub mongo_available: bool,
    pub error_code: Option<String>,
    pub reason: String,
}
