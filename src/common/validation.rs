// Common validation types and traits

use super::ApiError;

#[derive(Debug)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

#[derive(Debug)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub fn add_error(&mut self, field: &str, message: &str) {
        self.is_valid = false;
        self.errors.push(ValidationError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    /// Flags `value` when it exceeds `max` characters
    pub fn check_max_chars(&mut self, field: &str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.add_error(field, &format!("must not exceed {} characters", max));
        }
    }

    /// `Ok(())` when no errors were recorded, otherwise `ApiError::InvalidInput`
    pub fn into_result(self) -> Result<(), ApiError> {
        if self.is_valid {
            Ok(())
        } else {
            Err(ApiError::from(self))
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

pub trait Validator {
    fn validate(&self) -> ValidationResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_max_chars_counts_characters_not_bytes() {
        let mut result = ValidationResult::new();
        result.check_max_chars("title", "ééé", 3);
        assert!(result.is_valid);

        result.check_max_chars("title", "éééé", 3);
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].field, "title");
    }

    #[test]
    fn test_into_result() {
        assert!(ValidationResult::new().into_result().is_ok());

        let mut result = ValidationResult::new();
        result.add_error("email", "Email is required");
        assert!(matches!(result.into_result(), Err(ApiError::InvalidInput(_))));
    }
}
