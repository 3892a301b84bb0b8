use super::models::{LoginRequest, RegisterRequest, UpdateProfileRequest};
use crate::common::{ValidationResult, Validator};

pub const MAX_EMAIL_CHARS: usize = 254;
pub const MAX_PASSWORD_CHARS: usize = 1024;
pub const MAX_NAME_CHARS: usize = 100;

impl Validator for RegisterRequest {
    fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();

        let email = self.email.trim();
        if email.is_empty() {
            result.add_error("email", "Email is required");
        } else if !email.contains('@') {
            result.add_error("email", "Email must be a valid address");
        }
        result.check_max_chars("email", email, MAX_EMAIL_CHARS);

        if self.password.is_empty() {
            result.add_error("password", "Password is required");
        }
        result.check_max_chars("password", &self.password, MAX_PASSWORD_CHARS);

        if let Some(first_name) = &self.first_name {
            result.check_max_chars("first_name", first_name.trim(), MAX_NAME_CHARS);
        }
        if let Some(last_name) = &self.last_name {
            result.check_max_chars("last_name", last_name.trim(), MAX_NAME_CHARS);
        }

        result
    }
}

impl Validator for LoginRequest {
    fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();

        if self.email.trim().is_empty() {
            result.add_error("email", "Email is required");
        }
        if self.password.is_empty() {
            result.add_error("password", "Password is required");
        }
        result.check_max_chars("password", &self.password, MAX_PASSWORD_CHARS);

        result
    }
}

impl Validator for UpdateProfileRequest {
    fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();

        if self.first_name.is_none() && self.last_name.is_none() {
            result.add_error("profile", "No valid fields to update");
        }
        if let Some(first_name) = &self.first_name {
            result.check_max_chars("first_name", first_name.trim(), MAX_NAME_CHARS);
        }
        if let Some(last_name) = &self.last_name {
            result.check_max_chars("last_name", last_name.trim(), MAX_NAME_CHARS);
        }

        result
    }
}
