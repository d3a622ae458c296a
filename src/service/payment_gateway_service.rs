use crate::config::environment::AppConfig;
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

pub const METADATA_FINE_ID: &str = "fine_id";
pub const METADATA_DRIVER_ID: &str = "driver_id";
pub const METADATA_VIOLATION_CODE: &str = "violation_code";
pub const METADATA_PLATE: &str = "plate";

#[derive(Debug, Clone)]
pub enum GatewayError {
    Unavailable(String),
    Rejected(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentStatus {
    RequiresPayment,
    Processing,
    Succeeded,
    Canceled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIntentRequest {
    pub amount_minor: i64,
    pub currency: String,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedIntent {
    pub intent_id: String,
    pub client_handle: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentDetails {
    pub intent_id: String,
    pub status: IntentStatus,
    pub amount_minor: i64,
    pub currency: String,
    pub payment_method: Option<String>,
    pub settlement_ref: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_intent(&self, req: CreateIntentRequest) -> Result<CreatedIntent, GatewayError>;
    async fn retrieve_intent(&self, intent_id: &str) -> Result<IntentDetails, GatewayError>;
}

pub struct HttpPaymentGateway {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl HttpPaymentGateway {
    pub fn from_config(config: &AppConfig) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.gateway_timeout_seconds))
            .build()
            .map_err(|e| format!("failed to build gateway http client: {e}"))?;
        Ok(Self {
            base_url: config.gateway_base_url.trim_end_matches('/').to_string(),
            api_key: config.gateway_api_key.clone(),
            client,
        })
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.bearer_auth(key),
            None => req,
        }
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn create_intent(&self, req: CreateIntentRequest) -> Result<CreatedIntent, GatewayError> {
        let endpoint = format!("{}/v1/payment-intents", self.base_url);
        let response = self
            .authorize(self.client.post(endpoint))
            .json(&req)
            .send()
            .await
            .map_err(|e| GatewayError::Unavailable(format!("intent create failed: {e}")))?;

        if !response.status().is_success() {
            return Err(GatewayError::Rejected(format!(
                "gateway returned non-success status: {}",
                response.status()
            )));
        }

        response
            .json::<CreatedIntent>()
            .await
            .map_err(|e| GatewayError::Rejected(format!("intent create payload invalid: {e}")))
    }

    async fn retrieve_intent(&self, intent_id: &str) -> Result<IntentDetails, GatewayError> {
        let endpoint = format!("{}/v1/payment-intents/{intent_id}", self.base_url);
        let response = self
            .authorize(self.client.get(endpoint))
            .send()
            .await
            .map_err(|e| GatewayError::Unavailable(format!("intent lookup failed: {e}")))?;

        if !response.status().is_success() {
            return Err(GatewayError::Rejected(format!(
                "gateway returned non-success status: {}",
                response.status()
            )));
        }

        response
            .json::<IntentDetails>()
            .await
            .map_err(|e| GatewayError::Rejected(format!("intent payload invalid: {e}")))
    }
}

pub fn amount_to_minor_units(amount: Decimal) -> Result<i64, String> {
    let scaled = amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or_else(|| "amount out of range for minor units".to_string())?;
    if !scaled.fract().is_zero() {
        return Err("amount has sub-minor-unit precision".to_string());
    }
    scaled
        .trunc()
        .to_i64()
        .ok_or_else(|| "amount out of range for minor units".to_string())
}
