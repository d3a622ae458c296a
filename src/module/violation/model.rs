use super::schema::{ViolationCategory, ViolationSeverity};
use crate::module::fine::schema::CurrencyCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViolationRecord {
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
