//! Constraint metadata: declarations, the registry holding them and the
//! builder used to populate it

pub mod declaration;
pub mod shape;
pub mod store;

pub use declaration::{kinds, ConstraintDeclaration, MessageFn, MessageSource, Rule, EACH_PREFIX};
pub use shape::Shape;
pub use store::{metadata_store, MetadataStore};
