use super::aggregate;
use super::ExecutionMode;
use crate::error::{ValidationError, ValidatorError, ValidatorResult};
use crate::metadata::{kinds, ConstraintDeclaration, MetadataStore, Rule};
use crate::options::ValidatorOptions;
use crate::resolver::{ConstraintResolver, PropertyMetadata};
use crate::traits::Condition;
use crate::value::{Instance, Value};
use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

const UNKNOWN_VALUE_MESSAGE: &str = "an unknown value was passed to the validate function";

/// Children and the optional nested violation produced for one value
type Descent = (Vec<ValidationError>, Option<String>);

/// State of one top-level validation call
pub(crate) struct Executor<'a> {
    pub(super) resolver: ConstraintResolver<'a>,
    pub(super) options: &'a ValidatorOptions,
    pub(super) mode: ExecutionMode,
    halted: AtomicBool,
}

impl<'a> Executor<'a> {
    pub(crate) fn new(store: &'a MetadataStore, options: &'a ValidatorOptions, mode: ExecutionMode) -> Self {
        Self {
            resolver: ConstraintResolver::new(store),
            options,
            mode,
            halted: AtomicBool::new(false),
        }
    }

    /// Validate `instance` and everything reachable from its declared properties
    pub(crate) async fn run(&self, instance: &Instance) -> ValidatorResult<Vec<ValidationError>> {
        let errors = self.execute(instance.clone(), Vec::new()).await?;
        Ok(aggregate::strip_empty(errors))
    }

    /// Remember a recorded error when the call stops at the first one
    pub(super) fn record_failure(&self) {
        if self.options.stop_at_first_error {
            self.halted.store(true, Ordering::Release);
        }
    }

    pub(super) fn is_halted(&self) -> bool {
        self.halted.load(Ordering::Acquire)
    }

    pub(super) fn error_node(&self, target: &Value, property: &str, value: &Value) -> ValidationError {
        let settings = self.options.validation_error;
        ValidationError::new(property)
            .target(settings.target.then(|| target.clone()))
            .value(settings.value.then(|| value.clone()))
    }

    fn execute(&self, instance: Instance, mut path: Vec<usize>) -> BoxFuture<'_, ValidatorResult<Vec<ValidationError>>> {
        async move {
            let class = instance.class_name().unwrap_or_default().to_string();
            let known = !class.is_empty() && self.resolver.is_known(&class);

            if self.options.forbid_unknown_values && path.is_empty() && !known && !instance.is_plain() {
                tracing::debug!(class = %class, "rejecting instance of unknown class");
                let target = Value::Object(instance.clone());
                let mut error = self.error_node(&target, "", &target);
                error.constraints.insert(kinds::UNKNOWN_VALUE, UNKNOWN_VALUE_MESSAGE);
                self.record_failure();
                return Ok(vec![error]);
            }

            let properties = if known {
                self.resolver.resolve_properties(&class, self.options)
            } else {
                Vec::new()
            };

            if self.mode == ExecutionMode::Sync {
                self.ensure_synchronous(&class, &properties)?;
            }

            path.push(instance.identity());

            let whitelist_errors = if self.options.whitelist {
                self.apply_whitelist(&instance, &properties)
            } else {
                Vec::new()
            };
            if !whitelist_errors.is_empty() {
                self.record_failure();
            }

            let property_errors = if self.options.stop_at_first_error {
                let mut errors = Vec::new();
                for property in &properties {
                    if self.is_halted() {
                        break;
                    }
                    errors.push(self.validate_property(&instance, property, &path).await?);
                }
                errors
            } else {
                join_all(
                    properties
                        .iter()
                        .map(|property| self.validate_property(&instance, property, &path)),
                )
                .await
                .into_iter()
                .collect::<ValidatorResult<Vec<_>>>()?
            };

            Ok(aggregate::merge(whitelist_errors, property_errors))
        }
        .boxed()
    }

    /// Fail fast before evaluating anything that would have to suspend
    fn ensure_synchronous(&self, class: &str, properties: &[PropertyMetadata]) -> ValidatorResult<()> {
        let pending = properties
            .iter()
            .flat_map(|property| property.declarations.iter())
            .find(|declaration| declaration.requires_async());

        match pending {
            Some(declaration) => Err(ValidatorError::AsyncConstraintInSyncMode {
                class: class.to_string(),
                property: declaration.property().to_string(),
                constraint: declaration.kind().to_string(),
            }),
            None => Ok(()),
        }
    }

    async fn validate_property(
        &self,
        instance: &Instance,
        property: &PropertyMetadata,
        path: &[usize],
    ) -> ValidatorResult<ValidationError> {
        let value = instance.get(&property.name);
        let mut error = self.error_node(&Value::Object(instance.clone()), &property.name, &value);

        let mut conditions: Vec<&Arc<dyn Condition>> = Vec::new();
        let mut on_missing: Vec<&ConstraintDeclaration> = Vec::new();
        let mut checks: Vec<&ConstraintDeclaration> = Vec::new();
        let mut nested = false;
        for declaration in property.validating() {
            match declaration.rule() {
                Rule::ValidateIf(condition) => conditions.push(condition),
                Rule::Check(_) if declaration.runs_on_missing() => on_missing.push(declaration),
                Rule::Check(_) => checks.push(declaration),
                Rule::Nested => nested = true,
                Rule::Allow | Rule::AllowIf(_) => {}
            }
        }

        if !self.conditions_hold(instance, &property.name, &conditions)? {
            tracing::trace!(property = %property.name, "conditional validation skipped property");
            return Ok(error);
        }

        self.run_checks(&on_missing, &value, instance, &property.name, &mut error)
            .await?;

        if self.skips(&value) || self.is_halted() {
            return Ok(error);
        }

        self.run_checks(&checks, &value, instance, &property.name, &mut error)
            .await?;

        if self.is_halted() {
            return Ok(error);
        }

        let (children, violation) = self.descend(&value, &property.name, nested, path).await?;
        error.children = children;
        if let Some(message) = violation {
            error.constraints.insert(kinds::NESTED_VALIDATION, message);
        }

        tracing::trace!(
            property = %property.name,
            violations = error.total_violations(),
            "validated property"
        );
        Ok(error)
    }

    fn conditions_hold(
        &self,
        instance: &Instance,
        property: &str,
        conditions: &[&Arc<dyn Condition>],
    ) -> ValidatorResult<bool> {
        for condition in conditions {
            match condition.evaluate(instance) {
                Ok(true) => {}
                Ok(false) => return Ok(false),
                Err(fault) if self.options.surface_predicate_faults => {
                    return Err(ValidatorError::PredicateFault {
                        class: instance.class_name().unwrap_or_default().to_string(),
                        property: property.to_string(),
                        constraint: kinds::CONDITIONAL_VALIDATION.to_string(),
                        source: fault,
                    });
                }
                Err(fault) => {
                    tracing::warn!(
                        property,
                        error = %fault,
                        "validation condition failed, validating the property anyway"
                    );
                }
            }
        }
        Ok(true)
    }

    fn skips(&self, value: &Value) -> bool {
        let options = self.options;
        match value {
            Value::Undefined => options.skip_undefined_properties || options.skip_missing_properties,
            Value::Null => options.skip_null_properties || options.skip_missing_properties,
            _ => false,
        }
    }

    /// Recurse into a nested object or collection held by a property
    fn descend<'s>(
        &'s self,
        value: &'s Value,
        property: &'s str,
        explicit: bool,
        path: &'s [usize],
    ) -> BoxFuture<'s, ValidatorResult<Descent>> {
        async move {
            match value {
                Value::Undefined => Ok((Vec::new(), None)),
                Value::Object(child) => Ok((self.descend_into(child, explicit, path).await?, None)),
                Value::List(_) | Value::Map(_) => {
                    let entries = value.entries().unwrap_or_default();
                    let elements = if self.options.stop_at_first_error {
                        let mut elements = Vec::new();
                        for (key, item) in entries {
                            if self.is_halted() {
                                break;
                            }
                            elements.push(self.descend_element(value, key, item, property, explicit, path).await?);
                        }
                        elements
                    } else {
                        join_all(entries.into_iter().map(|(key, item)| {
                            self.descend_element(value, key, item, property, explicit, path)
                        }))
                        .await
                        .into_iter()
                        .collect::<ValidatorResult<Vec<_>>>()?
                    };
                    Ok((elements, None))
                }
                _ if explicit => {
                    self.record_failure();
                    Ok((
                        Vec::new(),
                        Some(format!("nested property {} must be either object or array", property)),
                    ))
                }
                _ => Ok((Vec::new(), None)),
            }
        }
        .boxed()
    }

    async fn descend_element(
        &self,
        collection: &Value,
        key: String,
        item: &Value,
        property: &str,
        explicit: bool,
        path: &[usize],
    ) -> ValidatorResult<ValidationError> {
        let mut element = self.error_node(collection, &key, item);
        match item {
            Value::Object(child) => {
                element.children = self.descend_into(child, explicit, path).await?;
            }
            Value::List(_) | Value::Map(_) => {
                let (children, violation) = self.descend(item, property, explicit, path).await?;
                element.children = children;
                if let Some(message) = violation {
                    element.constraints.insert(kinds::NESTED_VALIDATION, message);
                }
            }
            _ if explicit => {
                self.record_failure();
                element.constraints.insert(
                    kinds::NESTED_VALIDATION,
                    format!("each value in nested property {} must be either object or array", property),
                );
            }
            _ => {}
        }
        Ok(element)
    }

    async fn descend_into(
        &self,
        child: &Instance,
        explicit: bool,
        path: &[usize],
    ) -> ValidatorResult<Vec<ValidationError>> {
        if path.contains(&child.identity()) {
            tracing::trace!(
                class = child.class_name().unwrap_or_default(),
                "back-reference on the validation path, not descending"
            );
            return Ok(Vec::new());
        }

        let known = child
            .class_name()
            .map(|class| self.resolver.is_known(class))
            .unwrap_or(false);
        if !explicit && !known {
            return Ok(Vec::new());
        }

        self.execute(child.clone(), path.to_vec()).await
    }
}
