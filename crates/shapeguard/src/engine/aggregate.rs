//! Assembling per-object error lists

use crate::error::ValidationError;

/// Combine whitelist violations with property errors of the same object.
///
/// Whitelist violations come first; a property error for the same property is
/// folded into the existing node. Nodes left without content are dropped.
pub(crate) fn merge(whitelist: Vec<ValidationError>, property_errors: Vec<ValidationError>) -> Vec<ValidationError> {
    let mut merged = whitelist;

    for error in property_errors {
        match merged.iter_mut().find(|existing| existing.property == error.property) {
            Some(existing) => {
                existing.constraints.merge(error.constraints);
                existing.children.extend(error.children);
            }
            None => merged.push(error),
        }
    }

    strip_empty(merged)
}

/// Drop nodes without constraints, recursively
pub(crate) fn strip_empty(errors: Vec<ValidationError>) -> Vec<ValidationError> {
    errors
        .into_iter()
        .filter_map(|mut error| {
            error.children = strip_empty(std::mem::take(&mut error.children));
            (!error.is_empty()).then_some(error)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_whitelist_first() {
        let whitelist = vec![ValidationError::with_constraint("extra", "whitelist", "property extra should not exist")];
        let properties = vec![
            ValidationError::with_constraint("views", "min", "views must not be less than 0"),
            ValidationError::new("title"),
        ];

        let merged = merge(whitelist, properties);
        let names: Vec<&str> = merged.iter().map(|e| e.property.as_str()).collect();
        assert_eq!(names, vec!["extra", "views"]);
    }

    #[test]
    fn test_merge_folds_same_property() {
        let whitelist = vec![ValidationError::with_constraint("views", "whitelist", "property views should not exist")];
        let properties = vec![ValidationError::with_constraint("views", "min", "views must not be less than 0")];

        let merged = merge(whitelist, properties);
        assert_eq!(merged.len(), 1);
        let kinds: Vec<&str> = merged[0].constraints.kinds().collect();
        assert_eq!(kinds, vec!["whitelist", "min"]);
    }

    #[test]
    fn test_strip_empty_is_recursive() {
        let mut author = ValidationError::new("author");
        author.children.push(ValidationError::new("name"));
        let mut tags = ValidationError::new("tags");
        let mut element = ValidationError::new("0");
        element
            .children
            .push(ValidationError::with_constraint("label", "isString", "label must be a string"));
        tags.children.push(element);
        tags.children.push(ValidationError::new("1"));

        let stripped = strip_empty(vec![author, tags]);

        assert_eq!(stripped.len(), 1);
        assert_eq!(stripped[0].property, "tags");
        assert_eq!(stripped[0].children.len(), 1);
        assert_eq!(stripped[0].total_violations(), 1);
    }
}
