//! Process-wide registry of constraint declarations
//!
//! Declarations are registered once, typically at startup, and read by every
//! validation call afterwards. Reads take a shared lock only long enough to
//! clone the `Arc`s out, so concurrent validations never block each other
//! while constraints run.

use super::declaration::ConstraintDeclaration;
use crate::error::{ValidatorError, ValidatorResult};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Default)]
struct ClassEntry {
    parent: Option<String>,
    declarations: Vec<Arc<ConstraintDeclaration>>,
}

/// Registry mapping class names to their ordered declarations
#[derive(Debug, Default)]
pub struct MetadataStore {
    classes: RwLock<HashMap<String, ClassEntry>>,
}

static METADATA_STORE: Lazy<Arc<MetadataStore>> = Lazy::new(|| Arc::new(MetadataStore::new()));

/// The global metadata store shared by all validators created with `Validator::new`
pub fn metadata_store() -> Arc<MetadataStore> {
    Arc::clone(&METADATA_STORE)
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a declaration.
    ///
    /// Registering an identical declaration twice is a no-op. A property may
    /// carry at most one `whitelist-allow` and one `conditional-allow`.
    pub fn register(&self, declaration: ConstraintDeclaration) -> ValidatorResult<()> {
        let mut classes = self.classes.write();
        let entry = classes.entry(declaration.target().to_string()).or_default();

        if entry
            .declarations
            .iter()
            .any(|existing| existing.same_as(&declaration))
        {
            return Ok(());
        }

        if declaration.is_whitelist_marker()
            && entry.declarations.iter().any(|existing| {
                existing.property() == declaration.property() && existing.kind() == declaration.kind()
            })
        {
            return Err(ValidatorError::DuplicateDeclaration {
                class: declaration.target().to_string(),
                property: declaration.property().to_string(),
                kind: declaration.kind().to_string(),
            });
        }

        tracing::trace!(
            class = declaration.target(),
            property = declaration.property(),
            kind = declaration.kind(),
            "registered constraint declaration"
        );
        entry.declarations.push(Arc::new(declaration));
        Ok(())
    }

    /// Record that `class` inherits the declarations of `parent`
    pub fn register_class(&self, class: &str, parent: Option<&str>) -> ValidatorResult<()> {
        let mut classes = self.classes.write();

        if let Some(parent) = parent {
            let mut cursor = Some(parent.to_string());
            let mut hops = 0;
            while let Some(current) = cursor {
                if current == class || hops > classes.len() {
                    return Err(ValidatorError::InheritanceCycle {
                        class: class.to_string(),
                        parent: parent.to_string(),
                    });
                }
                cursor = classes.get(&current).and_then(|entry| entry.parent.clone());
                hops += 1;
            }

            classes.entry(parent.to_string()).or_default();
        }

        let entry = classes.entry(class.to_string()).or_default();
        match (entry.parent.clone(), parent) {
            (Some(existing), Some(requested)) if existing != requested => {
                Err(ValidatorError::ParentConflict {
                    class: class.to_string(),
                    existing,
                    requested: requested.to_string(),
                })
            }
            (None, Some(requested)) => {
                entry.parent = Some(requested.to_string());
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Class followed by its ancestors, nearest first
    fn lineage(classes: &HashMap<String, ClassEntry>, class: &str) -> Vec<String> {
        let mut lineage = vec![class.to_string()];
        let mut cursor = classes.get(class).and_then(|entry| entry.parent.clone());
        while let Some(current) = cursor {
            if lineage.contains(&current) {
                break;
            }
            cursor = classes.get(&current).and_then(|entry| entry.parent.clone());
            lineage.push(current);
        }
        lineage
    }

    /// Ancestors of `class`, root first, followed by the class itself
    pub fn ancestry(&self, class: &str) -> Vec<String> {
        let classes = self.classes.read();
        let mut lineage = Self::lineage(&classes, class);
        lineage.reverse();
        lineage
    }

    /// All declarations that apply to `class`, ancestors' declarations first.
    /// Unknown classes yield an empty list.
    pub fn get_constraints_for(&self, class: &str) -> Vec<Arc<ConstraintDeclaration>> {
        let classes = self.classes.read();
        let mut lineage = Self::lineage(&classes, class);
        lineage.reverse();

        lineage
            .iter()
            .filter_map(|name| classes.get(name))
            .flat_map(|entry| entry.declarations.iter().cloned())
            .collect()
    }

    /// Whether `class` or any ancestor has at least one declaration
    pub fn has_declarations(&self, class: &str) -> bool {
        let classes = self.classes.read();
        Self::lineage(&classes, class)
            .iter()
            .filter_map(|name| classes.get(name))
            .any(|entry| !entry.declarations.is_empty())
    }

    pub fn parent_of(&self, class: &str) -> Option<String> {
        self.classes.read().get(class).and_then(|entry| entry.parent.clone())
    }

    pub fn class_count(&self) -> usize {
        self.classes.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::declaration::Rule;
    use crate::validators::{IsDefined, Min};

    fn store_with_inheritance() -> MetadataStore {
        let store = MetadataStore::new();
        store.register_class("Post", Some("Entity")).unwrap();
        store
            .register(ConstraintDeclaration::new("Entity", "id", Rule::check(IsDefined)))
            .unwrap();
        store
            .register(ConstraintDeclaration::new("Post", "views", Rule::check(Min::new(0.0))))
            .unwrap();
        store
    }

    #[test]
    fn test_ancestor_declarations_come_first() {
        let store = store_with_inheritance();
        let declarations = store.get_constraints_for("Post");

        let order: Vec<(&str, &str)> = declarations
            .iter()
            .map(|d| (d.target(), d.property()))
            .collect();
        assert_eq!(order, vec![("Entity", "id"), ("Post", "views")]);
        assert_eq!(store.ancestry("Post"), vec!["Entity", "Post"]);
    }

    #[test]
    fn test_unknown_class_is_empty() {
        let store = store_with_inheritance();
        assert!(store.get_constraints_for("Comment").is_empty());
        assert!(!store.has_declarations("Comment"));
        assert!(store.has_declarations("Post"));
    }

    #[test]
    fn test_register_is_idempotent() {
        let store = MetadataStore::new();
        let declaration = ConstraintDeclaration::new("Post", "views", Rule::Allow);

        store.register(declaration.clone()).unwrap();
        store.register(declaration).unwrap();
        assert_eq!(store.get_constraints_for("Post").len(), 1);
    }

    #[test]
    fn test_second_conditional_allow_is_rejected() {
        let store = MetadataStore::new();
        store
            .register(ConstraintDeclaration::new(
                "Post",
                "views",
                Rule::allow_if(|_: &crate::value::Instance| true),
            ))
            .unwrap();
        store
            .register(ConstraintDeclaration::new("Post", "views", Rule::Allow))
            .unwrap();

        let result = store.register(ConstraintDeclaration::new(
            "Post",
            "views",
            Rule::allow_if(|_: &crate::value::Instance| false),
        ));
        assert!(matches!(result, Err(ValidatorError::DuplicateDeclaration { .. })));
    }

    #[test]
    fn test_inheritance_cycle_is_rejected() {
        let store = MetadataStore::new();
        store.register_class("B", Some("A")).unwrap();
        store.register_class("C", Some("B")).unwrap();

        let result = store.register_class("A", Some("C"));
        assert!(matches!(result, Err(ValidatorError::InheritanceCycle { .. })));
        assert!(matches!(
            store.register_class("B", Some("C")),
            Err(ValidatorError::InheritanceCycle { .. })
        ));
    }

    #[test]
    fn test_reparenting_is_rejected() {
        let store = MetadataStore::new();
        store.register_class("Post", Some("Entity")).unwrap();
        store.register_class("Post", Some("Entity")).unwrap();

        assert!(matches!(
            store.register_class("Post", Some("Document")),
            Err(ValidatorError::ParentConflict { .. })
        ));
        assert_eq!(store.parent_of("Post").as_deref(), Some("Entity"));
    }
}
