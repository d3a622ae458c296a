use crate::config::environment::AppConfig;
use crate::module::error::AppError;
use crate::module::fine::schema::CreateFineRequest;
use crate::module::user::schema::{CreateUserRequest, Role, UpdateUserRequest};
use crate::module::violation::schema::{CreateViolationRequest, UpdateViolationRequest};
use rust_decimal::Decimal;

pub fn validate_create_fine_request(
    config: &AppConfig,
    req: &CreateFineRequest,
) -> Result<(), AppError> {
    if req.driver_id.trim().is_empty() {
        return Err(AppError::bad_request(
            "INVALID_DRIVER_ID",
            "driver_id is required",
        ));
    }
    if req.violation_id.trim().is_empty() {
        return Err(AppError::bad_request(
            "INVALID_VIOLATION_ID",
            "violation_id is required",
        ));
    }
    validate_bounded_text(
        &req.message,
        config.fine_message_max_chars,
        "INVALID_MESSAGE",
        "message",
    )?;
    if let Some(amount) = req.custom_amount {
        validate_amount(amount, "INVALID_CUSTOM_AMOUNT", "custom_amount")?;
    }

    if !(-90.0..=90.0).contains(&req.location.latitude) {
        return Err(AppError::bad_request(
            "INVALID_LATITUDE",
            "latitude must be between -90 and 90",
        ));
    }
    if !(-180.0..=180.0).contains(&req.location.longitude) {
        return Err(AppError::bad_request(
            "INVALID_LONGITUDE",
            "longitude must be between -180 and 180",
        ));
    }
    validate_optional_text(req.location.address.as_deref(), 120, "INVALID_ADDRESS", "address")?;
    validate_optional_text(req.location.city.as_deref(), 60, "INVALID_CITY", "city")?;
    validate_optional_text(
        req.location.province.as_deref(),
        60,
        "INVALID_PROVINCE",
        "province",
    )?;

    validate_plate(&req.vehicle.plate)?;
    validate_optional_text(req.vehicle.make.as_deref(), 60, "INVALID_VEHICLE_MAKE", "make")?;
    validate_optional_text(
        req.vehicle.model.as_deref(),
        60,
        "INVALID_VEHICLE_MODEL",
        "model",
    )?;
    validate_optional_text(
        req.vehicle.color.as_deref(),
        40,
        "INVALID_VEHICLE_COLOR",
        "color",
    )?;

    if let Some(tags) = &req.tags {
        if tags.len() > config.max_tags {
            return Err(AppError::bad_request(
                "INVALID_TAGS",
                format!("at most {} tags are allowed", config.max_tags),
            ));
        }
        for tag in tags {
            validate_bounded_text(tag, config.tag_max_chars, "INVALID_TAGS", "tag")?;
        }
    }
    Ok(())
}

pub fn validate_note_content(config: &AppConfig, content: &str) -> Result<(), AppError> {
    validate_bounded_text(content, config.note_max_chars, "INVALID_NOTE_CONTENT", "content")
}

pub fn validate_dispute_reason(config: &AppConfig, reason: &str) -> Result<(), AppError> {
    validate_bounded_text(
        reason,
        config.fine_message_max_chars,
        "INVALID_DISPUTE_REASON",
        "reason",
    )
}

pub fn validate_create_violation_request(req: &CreateViolationRequest) -> Result<(), AppError> {
    validate_violation_code(&req.code)?;
    validate_bounded_text(&req.name, 120, "INVALID_VIOLATION_NAME", "name")?;
    validate_bounded_text(&req.description, 1000, "INVALID_VIOLATION_DESCRIPTION", "description")?;
    validate_amount(req.default_amount, "INVALID_DEFAULT_AMOUNT", "default_amount")?;
    if req.points > 100 {
        return Err(AppError::bad_request(
            "INVALID_POINTS",
            "points must be at most 100",
        ));
    }
    Ok(())
}

pub fn validate_update_violation_request(req: &UpdateViolationRequest) -> Result<(), AppError> {
    if let Some(name) = &req.name {
        validate_bounded_text(name, 120, "INVALID_VIOLATION_NAME", "name")?;
    }
    if let Some(description) = &req.description {
        validate_bounded_text(description, 1000, "INVALID_VIOLATION_DESCRIPTION", "description")?;
    }
    if let Some(amount) = req.default_amount {
        validate_amount(amount, "INVALID_DEFAULT_AMOUNT", "default_amount")?;
    }
    if let Some(points) = req.points {
        if points > 100 {
            return Err(AppError::bad_request(
                "INVALID_POINTS",
                "points must be at most 100",
            ));
        }
    }
    Ok(())
}

pub fn validate_create_user_request(req: &CreateUserRequest) -> Result<(), AppError> {
    validate_bounded_text(&req.full_name, 120, "INVALID_FULL_NAME", "full_name")?;
    if let Some(license) = req.license_number.as_deref() {
        validate_bounded_text(license, 40, "INVALID_LICENSE_NUMBER", "license_number")?;
    }
    if req.role == Role::Driver && req.license_number.is_none() {
        return Err(AppError::bad_request(
            "INVALID_LICENSE_NUMBER",
            "license_number is required for driver accounts",
        ));
    }
    Ok(())
}

pub fn validate_update_user_request(req: &UpdateUserRequest) -> Result<(), AppError> {
    if let Some(name) = &req.full_name {
        validate_bounded_text(name, 120, "INVALID_FULL_NAME", "full_name")?;
    }
    if let Some(license) = req.license_number.as_deref() {
        validate_bounded_text(license, 40, "INVALID_LICENSE_NUMBER", "license_number")?;
    }
    Ok(())
}

fn validate_amount(amount: Decimal, code: &'static str, field: &str) -> Result<(), AppError> {
    if amount.is_sign_negative() {
        return Err(AppError::bad_request(
            code,
            format!("{field} must be non-negative"),
        ));
    }
    let scaled = amount.checked_mul(Decimal::ONE_HUNDRED).ok_or_else(|| {
        AppError::bad_request(code, format!("{field} is out of range"))
    })?;
    if !scaled.fract().is_zero() {
        return Err(AppError::bad_request(
            code,
            format!("{field} must have at most two decimal places"),
        ));
    }
    Ok(())
}

fn validate_plate(plate: &str) -> Result<(), AppError> {
    let trimmed = plate.trim();
    if trimmed.len() < 2 || trimmed.len() > 16 {
        return Err(AppError::bad_request(
            "INVALID_PLATE",
            "plate must be between 2 and 16 characters",
        ));
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == ' ')
    {
        return Err(AppError::bad_request(
            "INVALID_PLATE",
            "plate contains invalid characters",
        ));
    }
    Ok(())
}

fn validate_violation_code(code: &str) -> Result<(), AppError> {
    let trimmed = code.trim();
    if trimmed.len() < 2 || trimmed.len() > 16 {
        return Err(AppError::bad_request(
            "INVALID_VIOLATION_CODE",
            "code must be between 2 and 16 characters",
        ));
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(AppError::bad_request(
            "INVALID_VIOLATION_CODE",
            "code may only contain letters, digits and hyphens",
        ));
    }
    Ok(())
}

fn validate_bounded_text(
    value: &str,
    max_chars: usize,
    code: &'static str,
    field: &str,
) -> Result<(), AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::bad_request(code, format!("{field} is required")));
    }
    if trimmed.chars().count() > max_chars {
        return Err(AppError::bad_request(
            code,
            format!("{field} must be at most {max_chars} characters"),
        ));
    }
    Ok(())
}

fn validate_optional_text(
    value: Option<&str>,
    max_chars: usize,
    code: &'static str,
    field: &str,
) -> Result<(), AppError> {
    match value {
        Some(v) => validate_bounded_text(v, max_chars, code, field),
        None => Ok(()),
    }
}
