//! Resolves which declarations apply to a class for one validation call

use crate::metadata::{ConstraintDeclaration, MetadataStore};
use crate::options::{InheritancePolicy, ValidatorOptions};
use std::sync::Arc;

/// Declarations of one property, in evaluation order
#[derive(Debug, Clone)]
pub struct PropertyMetadata {
    pub name: String,
    pub declarations: Vec<Arc<ConstraintDeclaration>>,
}

impl PropertyMetadata {
    /// Declarations that validate the value, excluding whitelist markers
    pub fn validating(&self) -> impl Iterator<Item = &Arc<ConstraintDeclaration>> {
        self.declarations.iter().filter(|d| !d.is_whitelist_marker())
    }
}

/// Group, inheritance and ordering rules applied on top of the store
pub struct ConstraintResolver<'a> {
    store: &'a MetadataStore,
}

impl<'a> ConstraintResolver<'a> {
    pub fn new(store: &'a MetadataStore) -> Self {
        Self { store }
    }

    /// Applicable declarations for `class`, in declaration order
    pub fn resolve(&self, class: &str, options: &ValidatorOptions) -> Vec<Arc<ConstraintDeclaration>> {
        let applicable: Vec<Arc<ConstraintDeclaration>> = self
            .store
            .get_constraints_for(class)
            .into_iter()
            .filter(|declaration| Self::is_applicable(declaration, options))
            .collect();

        match options.inheritance {
            InheritancePolicy::Append => applicable,
            InheritancePolicy::Override => Self::drop_shadowed(applicable),
        }
    }

    /// Resolve and group by property name, properties ordered by first declaration
    pub fn resolve_properties(&self, class: &str, options: &ValidatorOptions) -> Vec<PropertyMetadata> {
        group_by_property(self.resolve(class, options))
    }

    /// Whether `class` has any declaration at all, regardless of groups
    pub fn is_known(&self, class: &str) -> bool {
        self.store.has_declarations(class)
    }

    fn is_applicable(declaration: &ConstraintDeclaration, options: &ValidatorOptions) -> bool {
        let grouped = !declaration.group_names().is_empty();

        let always = match declaration.always_flag() {
            Some(always) => always,
            None => !grouped && options.always,
        };
        if always {
            return true;
        }

        match options.requested_groups() {
            Some(requested) => declaration
                .group_names()
                .iter()
                .any(|group| requested.contains(group)),
            None => !(options.strict_groups && grouped),
        }
    }

    /// Remove ancestor declarations overridden by a nearer class
    fn drop_shadowed(declarations: Vec<Arc<ConstraintDeclaration>>) -> Vec<Arc<ConstraintDeclaration>> {
        let shadowed: Vec<bool> = declarations
            .iter()
            .enumerate()
            .map(|(index, declaration)| {
                declarations[index + 1..].iter().any(|later| {
                    later.target() != declaration.target()
                        && later.property() == declaration.property()
                        && later.kind() == declaration.kind()
                })
            })
            .collect();

        declarations
            .into_iter()
            .zip(shadowed)
            .filter_map(|(declaration, shadowed)| (!shadowed).then_some(declaration))
            .collect()
    }
}

/// Group declarations by property, keeping first-appearance order
pub fn group_by_property(declarations: Vec<Arc<ConstraintDeclaration>>) -> Vec<PropertyMetadata> {
    let mut properties: Vec<PropertyMetadata> = Vec::new();
    for declaration in declarations {
        match properties
            .iter_mut()
            .find(|property| property.name == declaration.property())
        {
            Some(property) => property.declarations.push(declaration),
            None => properties.push(PropertyMetadata {
                name: declaration.property().to_string(),
                declarations: vec![declaration],
            }),
        }
    }
    properties
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{Rule, Shape};
    use crate::validators::{IsString, Length, Min};

    fn options_with_groups(groups: Option<&[&str]>) -> ValidatorOptions {
        ValidatorOptions {
            groups: groups.map(|g| g.iter().map(|s| s.to_string()).collect()),
            ..ValidatorOptions::default()
        }
    }

    fn kinds(declarations: &[Arc<ConstraintDeclaration>]) -> Vec<String> {
        declarations.iter().map(|d| d.kind().to_string()).collect()
    }

    fn grouped_store() -> MetadataStore {
        let store = MetadataStore::new();
        Shape::new("Post")
            .declare_with("title", Rule::check(Length::new().min(3)), |d| d.groups(["create"]))
            .constraint("title", IsString)
            .declare_with("views", Rule::check(Min::new(0.0)), |d| d.always(true))
            .register(&store)
            .unwrap();
        store
    }

    #[test]
    fn test_group_filtering() {
        let store = grouped_store();
        let resolver = ConstraintResolver::new(&store);

        let all = resolver.resolve("Post", &options_with_groups(None));
        assert_eq!(kinds(&all), vec!["isLength", "isString", "min"]);

        let create = resolver.resolve("Post", &options_with_groups(Some(&["create"])));
        assert_eq!(kinds(&create), vec!["isLength", "min"]);

        let update = resolver.resolve("Post", &options_with_groups(Some(&["update"])));
        assert_eq!(kinds(&update), vec!["min"]);
    }

    #[test]
    fn test_always_option_and_strict_groups() {
        let store = grouped_store();
        let resolver = ConstraintResolver::new(&store);

        let options = ValidatorOptions {
            always: true,
            ..options_with_groups(Some(&["update"]))
        };
        assert_eq!(kinds(&resolver.resolve("Post", &options)), vec!["isString", "min"]);

        let strict = ValidatorOptions {
            strict_groups: true,
            ..ValidatorOptions::default()
        };
        assert_eq!(kinds(&resolver.resolve("Post", &strict)), vec!["isString", "min"]);
    }

    #[test]
    fn test_inheritance_policies() {
        let store = MetadataStore::new();
        Shape::new("Entity")
            .constraint("name", Length::new().min(1))
            .constraint("name", IsString)
            .register(&store)
            .unwrap();
        Shape::new("User")
            .extends("Entity")
            .declare_with("name", Rule::check(Length::new().min(5)), |d| d.message("too short"))
            .register(&store)
            .unwrap();
        let resolver = ConstraintResolver::new(&store);

        let overridden = resolver.resolve("User", &ValidatorOptions::default());
        assert_eq!(kinds(&overridden), vec!["isString", "isLength"]);
        assert_eq!(overridden[1].target(), "User");

        let appended = resolver.resolve(
            "User",
            &ValidatorOptions {
                inheritance: InheritancePolicy::Append,
                ..ValidatorOptions::default()
            },
        );
        assert_eq!(kinds(&appended), vec!["isLength", "isString", "isLength"]);
    }

    #[test]
    fn test_group_by_property_keeps_order() {
        let store = grouped_store();
        let resolver = ConstraintResolver::new(&store);
        let properties = resolver.resolve_properties("Post", &ValidatorOptions::default());

        let names: Vec<&str> = properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["title", "views"]);
        assert_eq!(properties[0].declarations.len(), 2);
        assert!(resolver.is_known("Post"));
        assert!(!resolver.is_known("Comment"));
    }
}
