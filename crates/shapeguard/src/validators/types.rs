//! Type-checking validators

use crate::traits::{ConstraintValidator, ValidationArguments, Verdict};
use crate::value::Value;

/// Value must be a string
#[derive(Debug, Clone, Copy, Default)]
pub struct IsString;

impl ConstraintValidator for IsString {
    fn name(&self) -> &str {
        "isString"
    }

    fn validate(&self, value: &Value, _args: &ValidationArguments) -> Verdict {
        Verdict::from(matches!(value, Value::String(_)))
    }

    fn default_message(&self, each_prefix: &str, _args: &ValidationArguments) -> String {
        format!("{}$property must be a string", each_prefix)
    }
}

/// Value must be an ordered collection
#[derive(Debug, Clone, Copy, Default)]
pub struct IsArray;

impl ConstraintValidator for IsArray {
    fn name(&self) -> &str {
        "isArray"
    }

    fn validate(&self, value: &Value, _args: &ValidationArguments) -> Verdict {
        Verdict::from(matches!(value, Value::List(_)))
    }

    fn default_message(&self, each_prefix: &str, _args: &ValidationArguments) -> String {
        format!("{}$property must be an array", each_prefix)
    }
}
