//! Validation error types and handling

use crate::value::Value;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

pub type ValidatorResult<T> = Result<T, ValidatorError>;

/// Failure raised by a predicate while it was being evaluated
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PredicateFault {
    pub message: String,
}

impl PredicateFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors raised by the validator itself, as opposed to recorded violations
#[derive(Debug, Error)]
pub enum ValidatorError {
    #[error("constraint `{constraint}` on {class}.{property} is asynchronous and cannot run in synchronous validation")]
    AsyncConstraintInSyncMode {
        class: String,
        property: String,
        constraint: String,
    },

    #[error("synchronous validation suspended on a pending constraint")]
    SyncExecutionSuspended,

    #[error("constraint `{constraint}` on {class}.{property} failed to evaluate: {source}")]
    PredicateFault {
        class: String,
        property: String,
        constraint: String,
        #[source]
        source: PredicateFault,
    },

    #[error("conflicting `{kind}` declaration for {class}.{property}")]
    DuplicateDeclaration {
        class: String,
        property: String,
        kind: String,
    },

    #[error("class `{class}` cannot extend `{parent}`: inheritance cycle")]
    InheritanceCycle { class: String, parent: String },

    #[error("class `{class}` already extends `{existing}`, cannot extend `{requested}`")]
    ParentConflict {
        class: String,
        existing: String,
        requested: String,
    },

    #[error("validation failed with {} error(s)", .0.len())]
    Rejected(Vec<ValidationError>),
}

/// Constraint kind to message mapping, kept in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintMessages {
    entries: Vec<(String, String)>,
}

impl ConstraintMessages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a message. An existing kind keeps its position and gets the new message.
    pub fn insert(&mut self, kind: impl Into<String>, message: impl Into<String>) {
        let kind = kind.into();
        let message = message.into();
        match self.entries.iter_mut().find(|(k, _)| *k == kind) {
            Some(entry) => entry.1 = message,
            None => self.entries.push((kind, message)),
        }
    }

    pub fn get(&self, kind: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == kind)
            .map(|(_, message)| message.as_str())
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.get(kind).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(kind, _)| kind.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(kind, message)| (kind.as_str(), message.as_str()))
    }

    pub fn merge(&mut self, other: ConstraintMessages) {
        for (kind, message) in other.entries {
            self.insert(kind, message);
        }
    }
}

impl Serialize for ConstraintMessages {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (kind, message) in &self.entries {
            map.serialize_entry(kind, message)?;
        }
        map.end()
    }
}

/// Validation failure for one property, forming a tree for nested objects
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ValidationError {
    /// The object that was validated, when enabled by options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<Value>,
    /// Property name, collection index or map key. Empty for object-level errors.
    pub property: String,
    /// The offending value, when enabled by options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Failed constraint kinds and their messages
    #[serde(skip_serializing_if = "ConstraintMessages::is_empty")]
    pub constraints: ConstraintMessages,
    /// Errors of nested objects or collection elements
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ValidationError>,
}

impl ValidationError {
    /// Create an empty error node for a property
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            target: None,
            property: property.into(),
            value: None,
            constraints: ConstraintMessages::new(),
            children: Vec::new(),
        }
    }

    /// Create an error node carrying a single constraint message
    pub fn with_constraint(
        property: impl Into<String>,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let mut error = Self::new(property);
        error.constraints.insert(kind, message);
        error
    }

    pub fn target(mut self, target: Option<Value>) -> Self {
        self.target = target;
        self
    }

    pub fn value(mut self, value: Option<Value>) -> Self {
        self.value = value;
        self
    }

    pub fn has_constraint(&self, kind: &str) -> bool {
        self.constraints.contains(kind)
    }

    pub fn message(&self, kind: &str) -> Option<&str> {
        self.constraints.get(kind)
    }

    /// True when the node carries nothing at all
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty() && self.children.is_empty()
    }

    /// A node that only carries nested failures
    pub fn is_structural(&self) -> bool {
        self.constraints.is_empty() && !self.children.is_empty()
    }

    /// Find a direct child by property name
    pub fn child(&self, property: &str) -> Option<&ValidationError> {
        self.children.iter().find(|child| child.property == property)
    }

    /// Total number of constraint messages in this subtree
    pub fn total_violations(&self) -> usize {
        self.constraints.len()
            + self
                .children
                .iter()
                .map(ValidationError::total_violations)
                .sum::<usize>()
    }

    /// Convert to a JSON-serializable format for API responses
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    fn write_tree(&self, f: &mut fmt::Formatter<'_>, parent_path: &str) -> fmt::Result {
        let path = if parent_path.is_empty() {
            self.property.clone()
        } else if self.property.chars().all(|c| c.is_ascii_digit()) {
            format!("{}[{}]", parent_path, self.property)
        } else {
            format!("{}.{}", parent_path, self.property)
        };

        if !self.constraints.is_empty() {
            let messages: Vec<&str> = self.constraints.iter().map(|(_, m)| m).collect();
            writeln!(
                f,
                " - property {} has failed the following constraints: {}",
                if path.is_empty() { "<object>" } else { &path },
                messages.join(", ")
            )?;
        }
        for child in &self.children {
            child.write_tree(f, &path)?;
        }
        Ok(())
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let class = self
            .target
            .as_ref()
            .and_then(Value::as_instance)
            .and_then(|instance| instance.class_name())
            .unwrap_or("an object");
        writeln!(f, "An instance of {} has failed the validation:", class)?;
        self.write_tree(f, "")
    }
}
