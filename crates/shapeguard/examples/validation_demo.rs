//! Validation demo: registration, whitelist stripping and nested errors

use shapeguard::validators::{IsEmail, IsString, Length, Min};
use shapeguard::{Instance, Shape, Validator, ValidatorOptions, Value};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🦀 shapeguard Demo");
    println!("==================\n");

    register_shapes()?;
    let validator = Validator::new();

    demo_whitelist(&validator).await?;
    demo_nested_errors(&validator).await?;
    demo_conditional_allow(&validator).await?;

    println!("✅ All validation demos completed successfully!");
    Ok(())
}

fn register_shapes() -> Result<(), Box<dyn std::error::Error>> {
    Shape::new("Post")
        .defined("title")
        .constraint("title", Length::new().range(3, 80))
        .constraint("views", Min::new(0.0))
        .nested("author")
        .nested("tags")
        .allow_if("draftNotes", |post: &Instance| post.get("published").as_bool() != Some(true))
        .allow("published")
        .register_global()?;

    Shape::new("Author")
        .constraint("name", IsString)
        .constraint("email", IsEmail)
        .register_global()?;

    Shape::new("Tag").constraint("label", Length::new().min(2)).register_global()?;
    Ok(())
}

async fn demo_whitelist(validator: &Validator) -> Result<(), Box<dyn std::error::Error>> {
    println!("📝 Demo 1: Whitelist stripping");
    println!("------------------------------");

    let post = Instance::new("Post")
        .with("title", "hello")
        .with("views", 56)
        .with("unallowedProperty", 42);
    println!("  before: {}", post.to_json());

    let errors = validator.validate(&post, &ValidatorOptions::whitelisted()).await?;
    println!("  errors: {}", errors.len());
    println!("  after:  {}\n", post.to_json());
    Ok(())
}

async fn demo_nested_errors(validator: &Validator) -> Result<(), Box<dyn std::error::Error>> {
    println!("📝 Demo 2: Nested errors");
    println!("------------------------");

    let author = Instance::new("Author").with("name", "Ann").with("email", "not-an-email");
    let tags = vec![
        Value::from(Instance::new("Tag").with("label", "rust")),
        Value::from(Instance::new("Tag").with("label", "x")),
    ];
    let post = Instance::new("Post")
        .with("title", "hi")
        .with("views", -3)
        .with("author", author)
        .with("tags", tags);

    let options = ValidatorOptions::builder().error_details(true, false).build_config();
    for error in validator.validate(&post, &options).await? {
        print!("{}", error);
    }
    println!();
    Ok(())
}

async fn demo_conditional_allow(validator: &Validator) -> Result<(), Box<dyn std::error::Error>> {
    println!("📝 Demo 3: Conditional allow");
    println!("----------------------------");

    let post = Instance::new("Post")
        .with("title", "Release notes")
        .with("views", 0)
        .with("published", true)
        .with("draftNotes", "remember the changelog");

    match validator.validate_or_reject(&post, &ValidatorOptions::forbidding()).await {
        Ok(()) => println!("  published post accepted"),
        Err(error) => println!("  published post rejected: {}", error),
    }

    post.set("published", false);
    match validator.validate_or_reject(&post, &ValidatorOptions::forbidding()).await {
        Ok(()) => println!("  draft accepted with its notes"),
        Err(error) => println!("  draft rejected: {}", error),
    }
    println!();
    Ok(())
}
