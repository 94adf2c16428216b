//! Input checks shared by every service operation.

use autodb_types::{CarId, CarPayload};

use crate::error::{ServiceError, ServiceResult};

/// Reject a blank id.
pub fn validate_id(id: &CarId) -> ServiceResult<()> {
    if id.is_blank() {
        return Err(ServiceError::validation("id", "must not be empty"));
    }
    Ok(())
}

/// Reject blank text in a required field.
pub fn require_text(field: &str, value: &str) -> ServiceResult<()> {
    if value.trim().is_empty() {
        return Err(ServiceError::validation(field, "must not be empty"));
    }
    Ok(())
}

/// Check that every required payload field is present.
///
/// Engine capacity may be zero (electric drivetrains); price and top speed
/// may not.
pub fn validate_payload(payload: &CarPayload) -> ServiceResult<()> {
    require_text("name", &payload.name)?;
    require_text("model", &payload.model)?;
    require_text("companyName", &payload.company_name)?;
    require_text("image", &payload.image)?;
    if payload.price == 0 {
        return Err(ServiceError::validation("price", "must be greater than zero"));
    }
    if payload.top_speed == 0 {
        return Err(ServiceError::validation(
            "topSpeed",
            "must be greater than zero",
        ));
    }
    Ok(())
}

/// Parse a caller-supplied numeric query parameter.
///
/// Any finite decimal is accepted, including negative, fractional and
/// exponent forms. `NaN` and infinities are rejected.
pub fn parse_amount(field: &str, raw: &str) -> ServiceResult<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::validation(field, "must not be empty"));
    }
    match trimmed.parse::<f64>() {
        Ok(amount) if amount.is_finite() => Ok(amount),
        _ => Err(ServiceError::validation(
            field,
            format!("{raw:?} is not a number"),
        )),
    }
}
