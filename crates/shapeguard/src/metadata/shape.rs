//! Builder for declaring the constraints of a class in one place

use super::declaration::{ConstraintDeclaration, Rule};
use super::store::{metadata_store, MetadataStore};
use crate::error::ValidatorResult;
use crate::traits::{Condition, ConstraintValidator};
use crate::validators::IsDefined;
use crate::value::Instance;

/// Collects the declarations of one class before registering them
#[derive(Debug, Clone)]
pub struct Shape {
    class: String,
    parent: Option<String>,
    declarations: Vec<ConstraintDeclaration>,
}

impl Shape {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            parent: None,
            declarations: Vec::new(),
        }
    }

    /// Inherit the declarations of `parent`
    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Add a declaration with default settings
    pub fn declare(mut self, property: impl Into<String>, rule: Rule) -> Self {
        self.declarations
            .push(ConstraintDeclaration::new(self.class.clone(), property, rule));
        self
    }

    /// Add a declaration customised through `configure`
    pub fn declare_with<F>(mut self, property: impl Into<String>, rule: Rule, configure: F) -> Self
    where
        F: FnOnce(ConstraintDeclaration) -> ConstraintDeclaration,
    {
        let declaration = ConstraintDeclaration::new(self.class.clone(), property, rule);
        self.declarations.push(configure(declaration));
        self
    }

    /// Add a constraint checked against the property value
    pub fn constraint<V>(self, property: impl Into<String>, validator: V) -> Self
    where
        V: ConstraintValidator + 'static,
    {
        self.declare(property, Rule::check(validator))
    }

    /// Add a constraint checked against every element of the property value
    pub fn each<V>(self, property: impl Into<String>, validator: V) -> Self
    where
        V: ConstraintValidator + 'static,
    {
        self.declare_with(property, Rule::check(validator), |d| d.each(true))
    }

    /// Require the property to be present and not null, even when missing properties are skipped
    pub fn defined(self, property: impl Into<String>) -> Self {
        self.declare_with(property, Rule::check(IsDefined), |d| d.run_on_missing(true))
    }

    /// Skip the property's other constraints when its value is null or undefined
    pub fn optional(self, property: impl Into<String>) -> Self {
        let property = property.into();
        let name = property.clone();
        self.declare(
            property,
            Rule::validate_if(move |instance: &Instance| !instance.get(&name).is_missing()),
        )
    }

    /// Only validate the property while `condition` holds
    pub fn validate_if<C>(self, property: impl Into<String>, condition: C) -> Self
    where
        C: Condition + 'static,
    {
        self.declare(property, Rule::validate_if(condition))
    }

    /// Validate the nested object or collection stored in the property
    pub fn nested(self, property: impl Into<String>) -> Self {
        self.declare(property, Rule::Nested)
    }

    /// Allow-list the property without constraining it
    pub fn allow(self, property: impl Into<String>) -> Self {
        self.declare(property, Rule::Allow)
    }

    /// Allow-list the property while `condition` holds for the instance
    pub fn allow_if<C>(self, property: impl Into<String>, condition: C) -> Self
    where
        C: Condition + 'static,
    {
        self.declare(property, Rule::allow_if(condition))
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn declarations(&self) -> &[ConstraintDeclaration] {
        &self.declarations
    }

    /// Register the class and its declarations in `store`
    pub fn register(self, store: &MetadataStore) -> ValidatorResult<()> {
        store.register_class(&self.class, self.parent.as_deref())?;
        for declaration in self.declarations {
            store.register(declaration)?;
        }
        Ok(())
    }

    /// Register in the process-wide store
    pub fn register_global(self) -> ValidatorResult<()> {
        self.register(&metadata_store())
    }
}
