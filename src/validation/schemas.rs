use std::borrow::Cow;

use serde::Deserialize;
use validator::{Validate, ValidateEmail, ValidationError};

use super::{FieldKind, Schema};

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 100, message = "Full name must be between 3 and 100 characters"))]
    pub fullname: String,
    #[validate(custom(function = "validate_email_address"))]
    pub email: String,
    #[validate(custom(function = "validate_password"))]
    pub password: String,
    #[validate(custom(function = "validate_terms_accepted"))]
    pub terms: bool,
}

impl Schema for RegisterRequest {
    const FIELDS: &'static [(&'static str, FieldKind)] = &[
        ("fullname", FieldKind::String),
        ("email", FieldKind::String),
        ("password", FieldKind::String),
        ("terms", FieldKind::Bool),
    ];

    fn normalize(mut self) -> Self {
        self.fullname = self.fullname.trim().to_string();
        self.email = normalize_email(&self.email);
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginRequest {
    #[validate(custom(function = "validate_email_address"))]
    pub email: String,
    #[validate(custom(function = "validate_password"))]
    pub password: String,
    pub remember: bool,
}

impl Schema for LoginRequest {
    const FIELDS: &'static [(&'static str, FieldKind)] = &[
        ("email", FieldKind::String),
        ("password", FieldKind::String),
        ("remember", FieldKind::Bool),
    ];

    fn normalize(mut self) -> Self {
        self.email = normalize_email(&self.email);
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RefreshRequest {
    pub remember: bool,
}

impl Schema for RefreshRequest {
    const FIELDS: &'static [(&'static str, FieldKind)] = &[("remember", FieldKind::Bool)];
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

fn validate_email_address(email: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        return Err(error("required", "Email is required"));
    }
    if !email.validate_email() {
        return Err(error("email", "Please enter a valid email address"));
    }
    Ok(())
}

pub const PASSWORD_MIN_LENGTH: usize = 8;
pub const PASSWORD_MAX_LENGTH: usize = 128;

fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(error("required", "Password is required"));
    }

    let length = password.chars().count();
    if !(PASSWORD_MIN_LENGTH..=PASSWORD_MAX_LENGTH).contains(&length) {
        return Err(error("length", "Password must be between 8 and 128 characters"));
    }

    let has_lower = password.chars().any(|c| c.is_lowercase());
    let has_upper = password.chars().any(|c| c.is_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace());

    if !(has_lower && has_upper && has_digit && has_symbol) {
        return Err(error(
            "password_strength",
            "Password must contain upper and lower case letters, a number and a symbol",
        ));
    }
    Ok(())
}

fn validate_terms_accepted(terms: &bool) -> Result<(), ValidationError> {
    if *terms {
        Ok(())
    } else {
        Err(error("terms_required", "You must accept the terms and conditions"))
    }
}
