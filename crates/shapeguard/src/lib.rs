//! # shapeguard
//!
//! Object-graph validation in the spirit of class-validator. Constraints are
//! declared once per class shape and checked against every instance, with
//! nested and cyclic descent, groups, conditional validation, asynchronous
//! constraints and whitelist enforcement (stripping or rejecting properties
//! that carry no allow-listed metadata).
//!
//! ```no_run
//! use shapeguard::{Instance, Shape, ValidatorOptions};
//! use shapeguard::validators::Min;
//!
//! # async fn run() -> shapeguard::ValidatorResult<()> {
//! Shape::new("Post")
//!     .defined("title")
//!     .constraint("views", Min::new(0.0))
//!     .register_global()?;
//!
//! let post = Instance::new("Post")
//!     .with("title", "hello")
//!     .with("views", 56)
//!     .with("unallowedProperty", 42);
//!
//! let errors = shapeguard::validate(&post, &ValidatorOptions::whitelisted()).await?;
//! assert!(errors.is_empty());
//! assert!(!post.contains("unallowedProperty"));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod message;
pub mod metadata;
pub mod options;
pub mod resolver;
pub mod traits;
pub mod validator;
pub mod validators;
pub mod value;

mod engine;

// Re-exports for easy access
pub use error::{ConstraintMessages, PredicateFault, ValidationError, ValidatorError, ValidatorResult};
pub use metadata::{kinds, metadata_store, ConstraintDeclaration, MetadataStore, Rule, Shape};
pub use options::{InheritancePolicy, ValidationErrorOptions, ValidatorOptions, ValidatorOptionsBuilder};
pub use traits::{
    AsyncConstraint, AsyncConstraintValidator, Condition, ConstraintValidator, FallibleCondition,
    PredicateResult, ValidationArguments, Verdict,
};
pub use validator::{validate, validate_or_reject, validate_sync, Validator};
pub use value::{Instance, Value};
