use super::models::{CreateTaskRequest, UpdateTaskRequest};
use crate::common::{ValidationResult, Validator};

pub const MAX_TITLE_CHARS: usize = 500;

impl Validator for CreateTaskRequest {
    fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();

        match self.title.as_deref().map(str::trim) {
            None | Some("") => result.add_error("title", "Title is required"),
            Some(title) => result.check_max_chars("title", title, MAX_TITLE_CHARS),
        }

        result
    }
}

impl Validator for UpdateTaskRequest {
    fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();

        if self.title.is_none() && self.completed.is_none() {
            result.add_error("task", "No valid fields to update");
        }

        if let Some(title) = self.title.as_deref().map(str::trim) {
            if title.is_empty() {
                result.add_error("title", "Title must not be empty");
            }
            result.check_max_chars("title", title, MAX_TITLE_CHARS);
        }

        result
    }
}
