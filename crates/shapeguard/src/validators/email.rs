//! Email format validator

use crate::traits::{ConstraintValidator, ValidationArguments, Verdict};
use crate::value::Value;
use once_cell::sync::Lazy;
use regex::Regex;

// ASCII-only with TLD requirement (no leading or trailing dots)
static EMAIL_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9]([a-zA-Z0-9._%+-]*[a-zA-Z0-9])?@[a-zA-Z0-9]([a-zA-Z0-9.-]*[a-zA-Z0-9])?\.[a-zA-Z]{2,}$",
    )
    .ok()
});

/// String must be an email address
#[derive(Debug, Clone, Copy, Default)]
pub struct IsEmail;

impl IsEmail {
    fn is_email(text: &str) -> bool {
        let Some((local, domain)) = text.split_once('@') else {
            return false;
        };

        // RFC 5321 limits
        if local.len() > 64 || domain.len() > 253 {
            return false;
        }
        if local.contains("..") || domain.contains("..") {
            return false;
        }

        EMAIL_PATTERN
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(text))
    }
}

impl ConstraintValidator for IsEmail {
    fn name(&self) -> &str {
        "isEmail"
    }

    fn validate(&self, value: &Value, _args: &ValidationArguments) -> Verdict {
        Verdict::from(value.as_str().is_some_and(Self::is_email))
    }

    fn default_message(&self, each_prefix: &str, _args: &ValidationArguments) -> String {
        format!("{}$property must be an email", each_prefix)
    }
}
