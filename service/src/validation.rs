//! Field validation for registration requests.

use crate::ServiceError;

/// Loose structural check: one `@`, non-empty local part, dotted domain, no whitespace.
pub fn is_email(text: &str) -> bool {
    if text.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = text.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
}

pub fn required(key: &str, value: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::validation(key, "is required"));
    }
    Ok(())
}

pub fn email(key: &str, value: &str) -> Result<(), ServiceError> {
    required(key, value)?;
    if !is_email(value) {
        return Err(ServiceError::validation(key, "must be a valid email address"));
    }
    Ok(())
}
