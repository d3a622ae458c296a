use crate::module::fine::schema::CurrencyCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationSeverity {
    Minor,
    Low,
    Severe,
    DeathSevere,
}

impl ViolationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minor => "MINOR",
            Self::Low => "LOW",
            Self::Severe => "SEVERE",
            Self::DeathSevere => "DEATH_SEVERE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationCategory {
    Speeding,
    Parking,
    SignalViolation,
    Documentation,
    DangerousDriving,
    Pedestrian,
    Other,
}

impl ViolationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Speeding => "SPEEDING",
            Self::Parking => "PARKING",
            Self::SignalViolation => "SIGNAL_VIOLATION",
            Self::Documentation => "DOCUMENTATION",
            Self::DangerousDriving => "DANGEROUS_DRIVING",
            Self::Pedestrian => "PEDESTRIAN",
            Self::Other => "OTHER",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateViolationRequest {
    pub name: String,
    pub code: String,
    pub description: String,
    #[serde(alias = "defaultAmount")]
    pub default_amount: Decimal,
    pub currency: CurrencyCode,
    pub severity: ViolationSeverity,
    pub category: ViolationCategory,
    pub points: u32,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateViolationRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "defaultAmount")]
    pub default_amount: Option<Decimal>,
    pub currency: Option<CurrencyCode>,
    pub severity: Option<ViolationSeverity>,
    pub category: Option<ViolationCategory>,
    pub points: Option<u32>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViolationView {
    pub violation_id: String,
    pub code: String,
    pub name: String,
    pub description: String,
    pub default_amount: Decimal,
    pub currency: CurrencyCode,
    pub severity: ViolationSeverity,
    pub category: ViolationCategory,
    pub points: u32,
    pub active: bool,
    pub created_by: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateViolationResponse {
    pub created: bool,
    pub violation: Option<ViolationView>,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetViolationResponse {
    pub found: bool,
    pub violation: Option<ViolationView>,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListViolationsResponse {
    pub found: bool,
    pub total: usize,
    pub violations: Vec<ViolationView>,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateViolationResponse {
    pub updated: bool,
    pub violation: Option<ViolationView>,
    pub error_code: Option<String>,
    pub reason: String,
}
