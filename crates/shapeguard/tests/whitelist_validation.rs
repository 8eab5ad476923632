//! Integration tests for whitelist stripping, rejection and conditional allow

use shapeguard::validators::{IsString, Min};
use shapeguard::{
    kinds, FallibleCondition, Instance, MetadataStore, PredicateFault, Shape, Validator, ValidatorOptions,
    Value,
};
use std::sync::Arc;

fn validator_for(shapes: Vec<Shape>) -> Validator {
    let store = MetadataStore::new();
    for shape in shapes {
        shape.register(&store).unwrap();
    }
    Validator::with_store(Arc::new(store))
}

fn post_shape() -> Shape {
    Shape::new("Post").defined("title").constraint("views", Min::new(0.0))
}

#[tokio::test]
async fn test_whitelist_strips_undeclared_properties() {
    let validator = validator_for(vec![post_shape()]);
    let post = Instance::new("Post")
        .with("title", "hello")
        .with("views", 56)
        .with("unallowedProperty", 42);

    let errors = validator.validate(&post, &ValidatorOptions::whitelisted()).await.unwrap();

    assert!(errors.is_empty());
    assert_eq!(post.keys(), vec!["title", "views"]);
    assert_eq!(post.to_json(), serde_json::json!({ "title": "hello", "views": 56 }));
}

#[tokio::test]
async fn test_absent_conditionally_allowed_property_is_not_a_violation() {
    let validator = validator_for(vec![Shape::new("Post")
        .defined("title")
        .allow_if("views", |_: &Instance| false)]);
    let post = Instance::new("Post").with("title", "hello");

    let errors = validator.validate(&post, &ValidatorOptions::forbidding()).await.unwrap();

    assert!(errors.is_empty());
}

#[tokio::test]
async fn test_present_property_with_false_allow_condition_is_rejected() {
    let validator = validator_for(vec![Shape::new("Post")
        .defined("title")
        .allow_if("views", |_: &Instance| false)]);
    let post = Instance::new("Post").with("title", "hello").with("views", 56);

    let errors = validator.validate(&post, &ValidatorOptions::forbidding()).await.unwrap();

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].property, "views");
    assert_eq!(errors[0].constraints.kinds().collect::<Vec<_>>(), vec![kinds::WHITELIST]);
    assert_eq!(errors[0].message(kinds::WHITELIST), Some("property views should not exist"));
    assert_eq!(errors[0].value, Some(Value::from(56)));
    assert_eq!(errors[0].target, Some(Value::Object(post.clone())));
    assert!(post.contains("views"));
}

#[tokio::test]
async fn test_strip_and_reject_are_exclusive() {
    let validator = validator_for(vec![post_shape()]);

    let stripped = Instance::new("Post").with("title", "a").with("views", 1).with("extra", true);
    let errors = validator.validate(&stripped, &ValidatorOptions::whitelisted()).await.unwrap();
    assert!(errors.is_empty());
    assert!(!stripped.contains("extra"));

    let rejected = Instance::new("Post").with("title", "a").with("views", 1).with("extra", true);
    let errors = validator.validate(&rejected, &ValidatorOptions::forbidding()).await.unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].has_constraint(kinds::WHITELIST));
    assert!(rejected.contains("extra"));
}

#[tokio::test]
async fn test_allow_condition_is_evaluated_on_every_call() {
    let validator = validator_for(vec![Shape::new("Flags")
        .allow("flag")
        .allow_if("views", |o: &Instance| o.get("flag").as_bool() == Some(true))]);
    let flags = Instance::new("Flags").with("flag", false).with("views", 3);

    let first = validator.validate(&flags, &ValidatorOptions::forbidding()).await.unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].property, "views");

    flags.set("flag", true);
    let second = validator.validate(&flags, &ValidatorOptions::forbidding()).await.unwrap();
    assert!(second.is_empty());
}

#[tokio::test]
async fn test_whitelisting_is_idempotent() {
    let validator = validator_for(vec![post_shape()]);
    let post = Instance::new("Post")
        .with("title", "hello")
        .with("views", 56)
        .with("unallowedProperty", 42);

    let first = validator.validate(&post, &ValidatorOptions::whitelisted()).await.unwrap();
    let shape_after_first = post.keys();
    let second = validator.validate(&post, &ValidatorOptions::whitelisted()).await.unwrap();

    assert!(first.is_empty());
    assert!(second.is_empty());
    assert_eq!(post.keys(), shape_after_first);
}

#[tokio::test]
async fn test_other_declarations_allow_property_despite_false_condition() {
    let validator = validator_for(vec![Shape::new("Post")
        .allow_if("views", |_: &Instance| false)
        .constraint("views", Min::new(0.0))]);
    let post = Instance::new("Post").with("views", -1);

    let errors = validator.validate(&post, &ValidatorOptions::forbidding()).await.unwrap();

    assert_eq!(errors.len(), 1);
    assert!(!errors[0].has_constraint(kinds::WHITELIST));
    assert!(errors[0].has_constraint("min"));
}

#[tokio::test]
async fn test_faulting_allow_condition_fails_closed() {
    let validator = validator_for(vec![Shape::new("Post").allow_if(
        "views",
        FallibleCondition::new(|_: &Instance| Err(PredicateFault::new("lookup failed"))),
    )]);
    let post = Instance::new("Post").with("views", 1);

    let errors = validator.validate(&post, &ValidatorOptions::forbidding()).await.unwrap();

    assert_eq!(errors.len(), 1);
    assert!(errors[0].has_constraint(kinds::WHITELIST));
}

#[tokio::test]
async fn test_whitelist_applies_to_nested_objects() {
    let validator = validator_for(vec![
        Shape::new("Post").constraint("title", IsString).nested("author"),
        Shape::new("Author").constraint("name", IsString),
    ]);
    let author = Instance::new("Author").with("name", "Ann").with("password", "secret");
    let post = Instance::new("Post").with("title", "hello").with("author", author.clone());

    let errors = validator.validate(&post, &ValidatorOptions::whitelisted()).await.unwrap();

    assert!(errors.is_empty());
    assert_eq!(author.keys(), vec!["name"]);
}

#[tokio::test]
async fn test_without_whitelist_nothing_is_touched() {
    let validator = validator_for(vec![post_shape()]);
    let post = Instance::new("Post").with("title", "hello").with("views", 1).with("extra", 1);

    let errors = validator.validate(&post, &ValidatorOptions::default()).await.unwrap();

    assert!(errors.is_empty());
    assert!(post.contains("extra"));
}
