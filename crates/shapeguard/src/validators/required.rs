//! Presence validator

use crate::metadata::kinds;
use crate::traits::{ConstraintValidator, ValidationArguments, Verdict};
use crate::value::Value;

/// Fails on `undefined` and `null`.
///
/// Declared through [`Shape::defined`](crate::metadata::Shape::defined) it keeps
/// running when missing properties are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsDefined;

impl ConstraintValidator for IsDefined {
    fn name(&self) -> &str {
        kinds::IS_DEFINED
    }

    fn validate(&self, value: &Value, _args: &ValidationArguments) -> Verdict {
        Verdict::from(!value.is_missing())
    }

    fn default_message(&self, each_prefix: &str, _args: &ValidationArguments) -> String {
        format!("{}$property should not be null or undefined", each_prefix)
    }
}
