//! Constraint declarations attached to class properties

use crate::traits::{Condition, ConstraintValidator, ValidationArguments};
use std::sync::Arc;

/// Reserved constraint kinds produced by the engine itself
pub mod kinds {
    pub const WHITELIST: &str = "whitelist";
    pub const UNKNOWN_VALUE: &str = "unknownValue";
    pub const NESTED_VALIDATION: &str = "nestedValidation";
    pub const CONDITIONAL_VALIDATION: &str = "conditionalValidation";
    pub const WHITELIST_ALLOW: &str = "whitelist-allow";
    pub const CONDITIONAL_ALLOW: &str = "conditional-allow";
    pub const IS_DEFINED: &str = "isDefined";
}

/// Prefix added to default messages of per-element declarations
pub const EACH_PREFIX: &str = "each value in ";

/// What a declaration does
#[derive(Clone)]
pub enum Rule {
    /// Ordinary constraint checked against the property value
    Check(Arc<dyn ConstraintValidator>),
    /// Skip every other constraint of the property unless the condition holds
    ValidateIf(Arc<dyn Condition>),
    /// Validate nested objects and collections explicitly
    Nested,
    /// Mark the property as allow-listed
    Allow,
    /// Allow-list the property while the condition holds
    AllowIf(Arc<dyn Condition>),
}

impl Rule {
    pub fn check<V: ConstraintValidator + 'static>(validator: V) -> Self {
        Rule::Check(Arc::new(validator))
    }

    pub fn validate_if<C: Condition + 'static>(condition: C) -> Self {
        Rule::ValidateIf(Arc::new(condition))
    }

    pub fn allow_if<C: Condition + 'static>(condition: C) -> Self {
        Rule::AllowIf(Arc::new(condition))
    }

    /// Kind tag identifying the rule's semantics
    pub fn kind(&self) -> &str {
        match self {
            Rule::Check(validator) => validator.name(),
            Rule::ValidateIf(_) => kinds::CONDITIONAL_VALIDATION,
            Rule::Nested => kinds::NESTED_VALIDATION,
            Rule::Allow => kinds::WHITELIST_ALLOW,
            Rule::AllowIf(_) => kinds::CONDITIONAL_ALLOW,
        }
    }

    fn same_as(&self, other: &Rule) -> bool {
        match (self, other) {
            (Rule::Check(a), Rule::Check(b)) => Arc::ptr_eq(a, b),
            (Rule::ValidateIf(a), Rule::ValidateIf(b)) | (Rule::AllowIf(a), Rule::AllowIf(b)) => {
                Arc::ptr_eq(a, b)
            }
            (Rule::Nested, Rule::Nested) | (Rule::Allow, Rule::Allow) => true,
            _ => false,
        }
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Rule").field(&self.kind()).finish()
    }
}

/// Builds a message from the validation context
pub type MessageFn = Arc<dyn Fn(&ValidationArguments) -> String + Send + Sync>;

/// Custom message of a declaration
#[derive(Clone)]
pub enum MessageSource {
    Text(String),
    Builder(MessageFn),
}

impl std::fmt::Debug for MessageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageSource::Text(text) => f.debug_tuple("Text").field(text).finish(),
            MessageSource::Builder(_) => f.write_str("Builder"),
        }
    }
}

impl MessageSource {
    fn same_as(&self, other: &MessageSource) -> bool {
        match (self, other) {
            (MessageSource::Text(a), MessageSource::Text(b)) => a == b,
            (MessageSource::Builder(a), MessageSource::Builder(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// One constraint declared on one property of one class
#[derive(Debug, Clone)]
pub struct ConstraintDeclaration {
    target: String,
    property: String,
    rule: Rule,
    arguments: Vec<serde_json::Value>,
    groups: Vec<String>,
    each: bool,
    always: Option<bool>,
    run_on_missing: bool,
    message: Option<MessageSource>,
}

impl ConstraintDeclaration {
    pub fn new(target: impl Into<String>, property: impl Into<String>, rule: Rule) -> Self {
        let arguments = match &rule {
            Rule::Check(validator) => validator.arguments(),
            _ => Vec::new(),
        };
        Self {
            target: target.into(),
            property: property.into(),
            rule,
            arguments,
            groups: Vec::new(),
            each: false,
            always: None,
            run_on_missing: false,
            message: None,
        }
    }

    /// Restrict the declaration to the given groups
    pub fn groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    /// Apply the constraint to every element of an iterable value
    pub fn each(mut self, each: bool) -> Self {
        self.each = each;
        self
    }

    /// Run regardless of the requested groups
    pub fn always(mut self, always: bool) -> Self {
        self.always = Some(always);
        self
    }

    /// Keep running when the value is missing and missing properties are skipped
    pub fn run_on_missing(mut self, run: bool) -> Self {
        self.run_on_missing = run;
        self
    }

    /// Override constraint arguments exposed as `$constraintN`
    pub fn arguments(mut self, arguments: Vec<serde_json::Value>) -> Self {
        self.arguments = arguments;
        self
    }

    /// Custom message template
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(MessageSource::Text(message.into()));
        self
    }

    /// Custom message builder
    pub fn message_with<F>(mut self, builder: F) -> Self
    where
        F: Fn(&ValidationArguments) -> String + Send + Sync + 'static,
    {
        self.message = Some(MessageSource::Builder(Arc::new(builder)));
        self
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn kind(&self) -> &str {
        self.rule.kind()
    }

    pub fn constraint_arguments(&self) -> &[serde_json::Value] {
        &self.arguments
    }

    pub fn group_names(&self) -> &[String] {
        &self.groups
    }

    pub fn is_each(&self) -> bool {
        self.each
    }

    pub fn always_flag(&self) -> Option<bool> {
        self.always
    }

    pub fn runs_on_missing(&self) -> bool {
        self.run_on_missing
    }

    pub fn custom_message(&self) -> Option<&MessageSource> {
        self.message.as_ref()
    }

    /// Whether evaluating this declaration may suspend
    pub fn requires_async(&self) -> bool {
        matches!(&self.rule, Rule::Check(validator) if validator.is_async())
    }

    /// Whitelist marker declarations do not validate anything
    pub fn is_whitelist_marker(&self) -> bool {
        matches!(self.rule, Rule::Allow | Rule::AllowIf(_))
    }

    pub fn is_conditional_allow(&self) -> bool {
        matches!(self.rule, Rule::AllowIf(_))
    }

    /// Identical declarations register only once
    pub fn same_as(&self, other: &ConstraintDeclaration) -> bool {
        self.target == other.target
            && self.property == other.property
            && self.rule.same_as(&other.rule)
            && self.arguments == other.arguments
            && self.groups == other.groups
            && self.each == other.each
            && self.always == other.always
            && self.run_on_missing == other.run_on_missing
            && match (&self.message, &other.message) {
                (None, None) => true,
                (Some(a), Some(b)) => a.same_as(b),
                _ => false,
            }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::{IsArray, Min};

    #[test]
    fn test_check_declaration_takes_validator_arguments() {
        let declaration = ConstraintDeclaration::new("Post", "views", Rule::check(Min::new(0.0)));

        assert_eq!(declaration.kind(), "min");
        assert_eq!(declaration.constraint_arguments(), &[serde_json::json!(0.0)]);
        assert!(!declaration.requires_async());
    }

    #[test]
    fn test_kind_tags() {
        let allow = ConstraintDeclaration::new("Post", "views", Rule::Allow);
        let allow_if = ConstraintDeclaration::new(
            "Post",
            "views",
            Rule::allow_if(|_: &crate::value::Instance| true),
        );

        assert_eq!(allow.kind(), kinds::WHITELIST_ALLOW);
        assert_eq!(allow_if.kind(), kinds::CONDITIONAL_ALLOW);
        assert!(allow.is_whitelist_marker() && !allow.is_conditional_allow());
        assert!(allow_if.is_conditional_allow());
    }

    #[test]
    fn test_same_as_uses_rule_identity() {
        let rule = Rule::check(IsArray);
        let first = ConstraintDeclaration::new("Post", "tags", rule.clone()).groups(["create"]);
        let second = ConstraintDeclaration::new("Post", "tags", rule).groups(["create"]);
        let other = ConstraintDeclaration::new("Post", "tags", Rule::check(IsArray)).groups(["create"]);

        assert!(first.same_as(&second));
        assert!(!first.same_as(&other));
        assert!(!first.same_as(&second.clone().each(true)));
    }
}
