//! Pattern-based validators using regular expressions

use crate::traits::{ConstraintValidator, ValidationArguments, Verdict};
use crate::value::Value;
use regex::Regex;
use serde_json::json;

/// String must match a regular expression
#[derive(Debug, Clone)]
pub struct Matches {
    pattern: Regex,
}

impl Matches {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self::from_regex(Regex::new(pattern)?))
    }

    /// Create a case-insensitive pattern validator
    pub fn new_case_insensitive(pattern: &str) -> Result<Self, regex::Error> {
        Self::new(&format!("(?i){}", pattern))
    }

    pub fn from_regex(pattern: Regex) -> Self {
        Self { pattern }
    }

    pub fn pattern_string(&self) -> &str {
        self.pattern.as_str()
    }
}

impl ConstraintValidator for Matches {
    fn name(&self) -> &str {
        "matches"
    }

    fn validate(&self, value: &Value, _args: &ValidationArguments) -> Verdict {
        Verdict::from(value.as_str().is_some_and(|text| self.pattern.is_match(text)))
    }

    fn default_message(&self, each_prefix: &str, _args: &ValidationArguments) -> String {
        format!("{}$property must match $constraint1 regular expression", each_prefix)
    }

    fn arguments(&self) -> Vec<serde_json::Value> {
        vec![json!(self.pattern.as_str())]
    }
}
