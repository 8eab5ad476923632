//! String length validator

use crate::traits::{ConstraintValidator, ValidationArguments, Verdict};
use crate::value::Value;
use serde_json::json;

/// String length (in characters) within inclusive bounds
#[derive(Debug, Clone, Copy, Default)]
pub struct Length {
    /// Minimum length (inclusive)
    pub min: Option<usize>,
    /// Maximum length (inclusive)
    pub max: Option<usize>,
}

impl Length {
    /// Create a new length validator with no constraints
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min(mut self, min: usize) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    /// Set length range (min and max)
    pub fn range(self, min: usize, max: usize) -> Self {
        self.min(min).max(max)
    }

    fn too_short(&self, length: usize) -> bool {
        self.min.is_some_and(|min| length < min)
    }

    fn too_long(&self, length: usize) -> bool {
        self.max.is_some_and(|max| length > max)
    }
}

impl ConstraintValidator for Length {
    fn name(&self) -> &str {
        "isLength"
    }

    fn validate(&self, value: &Value, _args: &ValidationArguments) -> Verdict {
        let valid = value.as_str().is_some_and(|text| {
            // Unicode-aware length
            let length = text.chars().count();
            !self.too_short(length) && !self.too_long(length)
        });
        Verdict::from(valid)
    }

    fn default_message(&self, each_prefix: &str, args: &ValidationArguments) -> String {
        let length = args.value.as_str().map(|text| text.chars().count());
        match length {
            Some(length) if self.too_short(length) => format!(
                "{}$property must be longer than or equal to $constraint1 characters",
                each_prefix
            ),
            Some(length) if self.too_long(length) => format!(
                "{}$property must be shorter than or equal to $constraint2 characters",
                each_prefix
            ),
            _ => match (self.min, self.max) {
                (Some(_), Some(_)) => format!(
                    "{}$property must be longer than or equal to $constraint1 and shorter than or equal to $constraint2 characters",
                    each_prefix
                ),
                (None, Some(_)) => format!(
                    "{}$property must be shorter than or equal to $constraint2 characters",
                    each_prefix
                ),
                _ => format!(
                    "{}$property must be longer than or equal to $constraint1 characters",
                    each_prefix
                ),
            },
        }
    }

    fn arguments(&self) -> Vec<serde_json::Value> {
        vec![json!(self.min.unwrap_or(0)), json!(self.max)]
    }
}
