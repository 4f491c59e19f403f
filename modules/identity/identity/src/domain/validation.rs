//! Request rules for sign-in and profile updates. Lengths count characters.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::error::DomainError;
use identity_sdk::ProfileUpdate;

pub const MAX_NAME: usize = 50;
pub const MAX_SUMMARY: usize = 200;
pub const MAX_AVATAR: usize = 255;
pub const MIN_PASSWORD: usize = 6;
pub const MAX_PASSWORD: usize = 50;

#[allow(clippy::expect_used)] // literal pattern
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("static regex should not panic")
});

fn too_long(field: &str, max: usize) -> DomainError {
    DomainError::validation(format!("The {field} may not be greater than {max} characters."))
}

/// # Errors
/// Returns a validation error for a blank or malformed address.
pub fn validate_email(email: &str) -> Result<(), DomainError> {
    if email.is_empty() {
        return Err(DomainError::required("email"));
    }
    if !EMAIL.is_match(email) {
        return Err(DomainError::validation("The email must be a valid email address."));
    }
    Ok(())
}

/// # Errors
/// Returns the first violated rule as a validation error.
pub fn validate_login(email: &str, password: &str) -> Result<(), DomainError> {
    validate_email(email)?;
    if password.is_empty() {
        return Err(DomainError::required("password"));
    }
    Ok(())
}

/// # Errors
/// Returns a validation error when the password is outside the allowed length.
pub fn validate_password(password: &str) -> Result<(), DomainError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD {
        return Err(DomainError::validation(format!(
            "The password must be at least {MIN_PASSWORD} characters."
        )));
    }
    if len > MAX_PASSWORD {
        return Err(too_long("password", MAX_PASSWORD));
    }
    Ok(())
}

/// # Errors
/// Returns the first violated rule as a validation error.
pub fn validate_update(update: &ProfileUpdate) -> Result<(), DomainError> {
    if update.id.is_empty() {
        return Err(DomainError::required("id"));
    }
    if update.actor_id.is_empty() {
        return Err(DomainError::required("user_id"));
    }
    if update.name.trim().is_empty() {
        return Err(DomainError::required("name"));
    }
    if update.name.chars().count() > MAX_NAME {
        return Err(too_long("name", MAX_NAME));
    }
    if update.avatar.chars().count() > MAX_AVATAR {
        return Err(too_long("avatar", MAX_AVATAR));
    }
    if update.summary.chars().count() > MAX_SUMMARY {
        return Err(too_long("summary", MAX_SUMMARY));
    }
    if let Some(password) = update.password.as_deref() {
        validate_password(password)?;
    }
    Ok(())
}
