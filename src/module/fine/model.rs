use super::schema::{CurrencyCode, DisputeResolution, FineStatus, VehicleType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FineLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FineVehicle {
    pub plate: String,
    pub vehicle_type: VehicleType,
    pub make: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub payment_id: String,
    pub method: String,
    pub transaction_ref: String,
    pub receipt_number: String,
    pub paid_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisputeRecord {
    pub reason: String,
    pub raised_by: String,
    pub raised_at: i64,
    pub resolution: DisputeResolution,
    pub resolved_by: Option<String>,
    pub resolved_at: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FineNote {
    pub content: String,
    pub author_id: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FineStatusTransition {
    pub from_status: Option<FineStatus>,
    pub to_status: FineStatus,
    pub actor_id: String,
    pub reason: Option<String>,
    pub transitioned_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FineRecord {
    pub fine_id: String,
    pub driver_id: String,
    pub issued_by: String,
    pub violation_id: String,
    pub violation_code: String,
    pub violation_name: String,
    pub amount: Decimal,
    pub currency: CurrencyCode,
    pub message: String,
    pub location: FineLocation,
    pub vehicle: FineVehicle,
    pub tags: Vec<String>,
    pub status: FineStatus,
    pub issued_at: i64,
    pub due_at: i64,
    pub payment: Option<PaymentRecord>,
    pub dispute: Option<DisputeRecord>,
    pub notes: Vec<FineNote>,
    pub transitions: Vec<FineStatusTransition>,
}

impl FineRecord {
    pub fn effective_status(&self, now: i64) -> FineStatus {
        if self.status == FineStatus::Pending && now > self.due_at {
            FineStatus::Overdue
        } else {
            self.status
        }
    }
}
