//! Built-in constraints for common validation scenarios

pub mod custom;
pub mod email;
pub mod length;
pub mod numeric;
pub mod pattern;
pub mod required;
pub mod types;

pub use custom::CustomConstraint;
pub use email::IsEmail;
pub use length::Length;
pub use numeric::{Max, Min};
pub use pattern::Matches;
pub use required::IsDefined;
pub use types::{IsArray, IsString};
