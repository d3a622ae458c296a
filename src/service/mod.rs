pub mod auth_service;
pub mod payment_gateway_service;
pub mod receipt_service;
pub mod validation_service;
pub mod webhook_signature_service;
