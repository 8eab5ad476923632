//! Custom validation functions and closures

use crate::traits::{ConstraintValidator, PredicateResult, ValidationArguments, Verdict};
use crate::value::Value;
use serde_json::json;
use std::sync::Arc;

/// Type alias for sync validation functions
pub type SyncValidationFn = Arc<dyn Fn(&Value, &ValidationArguments) -> PredicateResult + Send + Sync>;

/// Constraint backed by a user-supplied synchronous closure
#[derive(Clone)]
pub struct CustomConstraint {
    name: String,
    check: SyncValidationFn,
    message: Option<String>,
    arguments: Vec<serde_json::Value>,
}

impl CustomConstraint {
    /// Create a constraint from a closure that cannot fail
    pub fn new<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Value, &ValidationArguments) -> bool + Send + Sync + 'static,
    {
        Self::fallible(name, move |value, args| Ok(check(value, args)))
    }

    /// Create a constraint from a closure that may fail to decide
    pub fn fallible<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Value, &ValidationArguments) -> PredicateResult + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            check: Arc::new(check),
            message: None,
            arguments: Vec::new(),
        }
    }

    /// Default message template, may use the usual `$` tokens
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Arguments exposed as `$constraint1..N`
    pub fn with_arguments(mut self, arguments: Vec<serde_json::Value>) -> Self {
        self.arguments = arguments;
        self
    }

    /// Value must be one of the allowed strings
    pub fn one_of(name: impl Into<String>, allowed: Vec<String>) -> Self {
        let arguments = vec![json!(allowed.clone())];
        Self::new(name, move |value, _| {
            value
                .as_str()
                .is_some_and(|text| allowed.iter().any(|candidate| candidate == text))
        })
        .message("$property must be one of the following values: $constraint1")
        .with_arguments(arguments)
    }

    /// Value must not be one of the forbidden strings
    pub fn not_one_of(name: impl Into<String>, forbidden: Vec<String>) -> Self {
        let arguments = vec![json!(forbidden.clone())];
        Self::new(name, move |value, _| {
            // Non-string values are let through
            value
                .as_str()
                .map_or(true, |text| !forbidden.iter().any(|candidate| candidate == text))
        })
        .message("$property should not be one of the following values: $constraint1")
        .with_arguments(arguments)
    }
}

impl std::fmt::Debug for CustomConstraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomConstraint")
            .field("name", &self.name)
            .field("message", &self.message)
            .field("arguments", &self.arguments)
            .finish()
    }
}

impl ConstraintValidator for CustomConstraint {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self, value: &Value, args: &ValidationArguments) -> Verdict {
        Verdict::from((self.check)(value, args))
    }

    fn default_message(&self, each_prefix: &str, _args: &ValidationArguments) -> String {
        match &self.message {
            Some(message) => format!("{}{}", each_prefix, message),
            None => format!("{}$property failed the {} check", each_prefix, self.name),
        }
    }

    fn arguments(&self) -> Vec<serde_json::Value> {
        self.arguments.clone()
    }
}
