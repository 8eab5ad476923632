//! Validation options and builder

use serde::{Deserialize, Serialize};
use service_builder::error::BuildError;

/// Which parts of the validated data are copied into error nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationErrorOptions {
    /// Attach the validated object as `target`
    pub target: bool,
    /// Attach the offending value as `value`
    pub value: bool,
}

impl Default for ValidationErrorOptions {
    fn default() -> Self {
        Self {
            target: true,
            value: true,
        }
    }
}

/// How declarations inherited from ancestor classes combine with a class's own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InheritancePolicy {
    /// A class's declaration replaces an ancestor's declaration of the same
    /// kind on the same property
    #[default]
    Override,
    /// Ancestor and class declarations all run, ancestors first
    Append,
}

/// Options for a single validation call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorOptions {
    /// Skip constraints on properties that are null or undefined
    pub skip_missing_properties: bool,

    /// Skip constraints on properties that are undefined
    pub skip_undefined_properties: bool,

    /// Skip constraints on properties that are null
    pub skip_null_properties: bool,

    /// Strip (or reject) properties without allow-listed metadata
    pub whitelist: bool,

    /// Report non-whitelisted properties instead of stripping them
    pub forbid_non_whitelisted: bool,

    /// Fail objects whose class has no declarations at all
    pub forbid_unknown_values: bool,

    /// Groups to validate; `None` validates every declaration
    pub groups: Option<Vec<String>>,

    /// Ignore grouped declarations when no groups were requested
    pub strict_groups: bool,

    /// Default for declarations without an explicit `always` flag
    pub always: bool,

    /// Leave messages empty instead of using constraint defaults
    pub dismiss_default_messages: bool,

    pub validation_error: ValidationErrorOptions,

    /// Stop the whole validation at the first recorded error
    pub stop_at_first_error: bool,

    /// Propagate predicate faults as errors instead of recording failures
    pub surface_predicate_faults: bool,

    pub inheritance: InheritancePolicy,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            skip_missing_properties: false,
            skip_undefined_properties: false,
            skip_null_properties: false,
            whitelist: false,
            forbid_non_whitelisted: false,
            forbid_unknown_values: false,
            groups: None,
            strict_groups: false,
            always: false,
            dismiss_default_messages: false,
            validation_error: ValidationErrorOptions::default(),
            stop_at_first_error: false,
            surface_predicate_faults: false,
            inheritance: InheritancePolicy::default(),
        }
    }
}

/// Builder for [`ValidatorOptions`]; unset fields fall back to `Default::default()`
pub struct ValidatorOptionsBuilder {
    skip_missing_properties: Option<bool>,
    skip_undefined_properties: Option<bool>,
    skip_null_properties: Option<bool>,
    whitelist: Option<bool>,
    forbid_non_whitelisted: Option<bool>,
    forbid_unknown_values: Option<bool>,
    groups: Option<Option<Vec<String>>>,
    strict_groups: Option<bool>,
    always: Option<bool>,
    dismiss_default_messages: Option<bool>,
    validation_error: Option<ValidationErrorOptions>,
    stop_at_first_error: Option<bool>,
    surface_predicate_faults: Option<bool>,
    inheritance: Option<InheritancePolicy>,
}

impl ValidatorOptionsBuilder {
    pub fn new() -> Self {
        Self {
            skip_missing_properties: None,
            skip_undefined_properties: None,
            skip_null_properties: None,
            whitelist: None,
            forbid_non_whitelisted: None,
            forbid_unknown_values: None,
            groups: None,
            strict_groups: None,
            always: None,
            dismiss_default_messages: None,
            validation_error: None,
            stop_at_first_error: None,
            surface_predicate_faults: None,
            inheritance: None,
        }
    }

    pub fn skip_missing_properties(mut self, value: bool) -> Self {
        self.skip_missing_properties = Some(value);
        self
    }

    pub fn skip_undefined_properties(mut self, value: bool) -> Self {
        self.skip_undefined_properties = Some(value);
        self
    }

    pub fn skip_null_properties(mut self, value: bool) -> Self {
        self.skip_null_properties = Some(value);
        self
    }

    pub fn whitelist(mut self, value: bool) -> Self {
        self.whitelist = Some(value);
        self
    }

    pub fn forbid_non_whitelisted(mut self, value: bool) -> Self {
        self.forbid_non_whitelisted = Some(value);
        self
    }

    pub fn forbid_unknown_values(mut self, value: bool) -> Self {
        self.forbid_unknown_values = Some(value);
        self
    }

    pub fn groups(mut self, value: Option<Vec<String>>) -> Self {
        self.groups = Some(value);
        self
    }

    pub fn strict_groups(mut self, value: bool) -> Self {
        self.strict_groups = Some(value);
        self
    }

    pub fn always(mut self, value: bool) -> Self {
        self.always = Some(value);
        self
    }

    pub fn dismiss_default_messages(mut self, value: bool) -> Self {
        self.dismiss_default_messages = Some(value);
        self
    }

    pub fn validation_error(mut self, value: ValidationErrorOptions) -> Self {
        self.validation_error = Some(value);
        self
    }

    pub fn stop_at_first_error(mut self, value: bool) -> Self {
        self.stop_at_first_error = Some(value);
        self
    }

    pub fn surface_predicate_faults(mut self, value: bool) -> Self {
        self.surface_predicate_faults = Some(value);
        self
    }

    pub fn inheritance(mut self, value: InheritancePolicy) -> Self {
        self.inheritance = Some(value);
        self
    }

    pub fn build(self) -> Result<ValidatorOptions, BuildError> {
        Ok(ValidatorOptions {
            skip_missing_properties: self.skip_missing_properties.unwrap_or_default(),
            skip_undefined_properties: self.skip_undefined_properties.unwrap_or_default(),
            skip_null_properties: self.skip_null_properties.unwrap_or_default(),
            whitelist: self.whitelist.unwrap_or_default(),
            forbid_non_whitelisted: self.forbid_non_whitelisted.unwrap_or_default(),
            forbid_unknown_values: self.forbid_unknown_values.unwrap_or_default(),
            groups: self.groups.unwrap_or_default(),
            strict_groups: self.strict_groups.unwrap_or_default(),
            always: self.always.unwrap_or_default(),
            dismiss_default_messages: self.dismiss_default_messages.unwrap_or_default(),
            validation_error: self.validation_error.unwrap_or_default(),
            stop_at_first_error: self.stop_at_first_error.unwrap_or_default(),
            surface_predicate_faults: self.surface_predicate_faults.unwrap_or_default(),
            inheritance: self.inheritance.unwrap_or_default(),
        })
    }

    pub fn build_with_defaults(self) -> Result<ValidatorOptions, BuildError> {
        Ok(ValidatorOptions {
            skip_missing_properties: self.skip_missing_properties.unwrap_or_default(),
            skip_undefined_properties: self.skip_undefined_properties.unwrap_or_default(),
            skip_null_properties: self.skip_null_properties.unwrap_or_default(),
            whitelist: self.whitelist.unwrap_or_default(),
            forbid_non_whitelisted: self.forbid_non_whitelisted.unwrap_or_default(),
            forbid_unknown_values: self.forbid_unknown_values.unwrap_or_default(),
            groups: self.groups.unwrap_or_default(),
            strict_groups: self.strict_groups.unwrap_or_default(),
            always: self.always.unwrap_or_default(),
            dismiss_default_messages: self.dismiss_default_messages.unwrap_or_default(),
            validation_error: self.validation_error.unwrap_or_default(),
            stop_at_first_error: self.stop_at_first_error.unwrap_or_default(),
            surface_predicate_faults: self.surface_predicate_faults.unwrap_or_default(),
            inheritance: self.inheritance.unwrap_or_default(),
        })
    }
}

impl ValidatorOptions {
    pub fn builder() -> ValidatorOptionsBuilder {
        ValidatorOptionsBuilder::new()
    }
}

impl ValidatorOptions {
    /// Options that strip non-whitelisted properties
    pub fn whitelisted() -> Self {
        Self {
            whitelist: true,
            ..Self::default()
        }
    }

    /// Options that report non-whitelisted properties
    pub fn forbidding() -> Self {
        Self {
            whitelist: true,
            forbid_non_whitelisted: true,
            ..Self::default()
        }
    }

    /// Requested groups, `None` when no group filter applies
    pub fn requested_groups(&self) -> Option<&[String]> {
        self.groups.as_deref().filter(|groups| !groups.is_empty())
    }
}

// Add convenience methods to the generated builder
impl ValidatorOptionsBuilder {
    pub fn with_groups<I, S>(self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups(Some(groups.into_iter().map(Into::into).collect()))
    }

    pub fn strip_unknown(self) -> Self {
        self.whitelist(true).forbid_non_whitelisted(false)
    }

    pub fn reject_unknown(self) -> Self {
        self.whitelist(true).forbid_non_whitelisted(true)
    }

    /// Choose whether error nodes carry the validated object and the offending value
    pub fn error_details(self, target: bool, value: bool) -> Self {
        self.validation_error(ValidationErrorOptions { target, value })
    }

    pub fn build_config(self) -> ValidatorOptions {
        self.build_with_defaults().unwrap_or_default()
    }
}
