use super::walker::Executor;
use crate::error::ValidationError;
use crate::metadata::{kinds, Rule};
use crate::resolver::PropertyMetadata;
use crate::value::{Instance, Value};

impl Executor<'_> {
    /// Strip or report every own property that is not allow-listed.
    ///
    /// Returns the whitelist violations, which are only produced when
    /// `forbid_non_whitelisted` is set. Otherwise disallowed properties are
    /// removed from `instance`.
    pub(super) fn apply_whitelist(
        &self,
        instance: &Instance,
        properties: &[PropertyMetadata],
    ) -> Vec<ValidationError> {
        let mut violations = Vec::new();

        for name in instance.keys() {
            let metadata = properties.iter().find(|property| property.name == name);
            if metadata.is_some_and(|property| is_allowed(instance, property)) {
                continue;
            }

            if self.options.forbid_non_whitelisted {
                let value = instance.get(&name);
                let mut error = self.error_node(&Value::Object(instance.clone()), &name, &value);
                error
                    .constraints
                    .insert(kinds::WHITELIST, format!("property {} should not exist", name));
                violations.push(error);
            } else {
                tracing::debug!(
                    class = instance.class_name().unwrap_or_default(),
                    property = %name,
                    "stripping non-whitelisted property"
                );
                instance.remove(&name);
            }
        }

        violations
    }
}

/// Any declaration other than a conditional allow marks the property allowed;
/// conditional allows are asked every time and a faulting one counts as false.
fn is_allowed(instance: &Instance, property: &PropertyMetadata) -> bool {
    if property
        .declarations
        .iter()
        .any(|declaration| !declaration.is_conditional_allow())
    {
        return true;
    }

    property.declarations.iter().any(|declaration| match declaration.rule() {
        Rule::AllowIf(condition) => match condition.evaluate(instance) {
            Ok(allowed) => allowed,
            Err(fault) => {
                tracing::warn!(
                    property = %property.name,
                    error = %fault,
                    "allow condition failed, treating property as not allowed"
                );
                false
            }
        },
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ExecutionMode;
    use crate::error::PredicateFault;
    use crate::metadata::{MetadataStore, Shape};
    use crate::options::ValidatorOptions;
    use crate::traits::FallibleCondition;
    use crate::validators::Min;

    fn store() -> MetadataStore {
        let store = MetadataStore::new();
        Shape::new("Post")
            .defined("title")
            .constraint("views", Min::new(0.0))
            .allow_if("draft", |o: &Instance| o.get("editable").as_bool() == Some(true))
            .allow_if("secret", FallibleCondition::new(|_: &Instance| Err(PredicateFault::new("boom"))))
            .register(&store)
            .unwrap();
        store
    }

    fn run(store: &MetadataStore, options: &ValidatorOptions, instance: &Instance) -> Vec<ValidationError> {
        let executor = Executor::new(store, options, ExecutionMode::Async);
        let properties = executor.resolver.resolve_properties("Post", options);
        executor.apply_whitelist(instance, &properties)
    }

    #[test]
    fn test_strips_undeclared_properties() {
        let store = store();
        let post = Instance::new("Post")
            .with("title", "hello")
            .with("views", 56)
            .with("unallowedProperty", 42);

        let violations = run(&store, &ValidatorOptions::whitelisted(), &post);

        assert!(violations.is_empty());
        assert_eq!(post.keys(), vec!["title", "views"]);
    }

    #[test]
    fn test_reports_instead_of_stripping() {
        let store = store();
        let post = Instance::new("Post").with("title", "hello").with("extra", true);

        let violations = run(&store, &ValidatorOptions::forbidding(), &post);

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].property, "extra");
        assert_eq!(
            violations[0].message(kinds::WHITELIST),
            Some("property extra should not exist")
        );
        assert!(post.contains("extra"));
    }

    #[test]
    fn test_conditional_allow_follows_instance_state() {
        let store = store();
        let post = Instance::new("Post").with("draft", "text").with("editable", false);

        let violations = run(&store, &ValidatorOptions::forbidding(), &post);
        let properties: Vec<&str> = violations.iter().map(|v| v.property.as_str()).collect();
        assert_eq!(properties, vec!["draft", "editable"]);

        post.set("editable", true);
        let violations = run(&store, &ValidatorOptions::forbidding(), &post);
        let properties: Vec<&str> = violations.iter().map(|v| v.property.as_str()).collect();
        assert_eq!(properties, vec!["editable"]);
    }

    #[test]
    fn test_faulting_allow_condition_fails_closed() {
        let store = store();
        let post = Instance::new("Post").with("secret", "x");

        run(&store, &ValidatorOptions::whitelisted(), &post);
        assert!(!post.contains("secret"));
    }
}
