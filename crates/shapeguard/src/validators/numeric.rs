//! Numeric bound validators

use crate::traits::{ConstraintValidator, ValidationArguments, Verdict};
use crate::value::Value;
use serde_json::json;

/// Number must be greater than or equal to the bound
#[derive(Debug, Clone, Copy)]
pub struct Min {
    min: f64,
}

impl Min {
    pub fn new(min: f64) -> Self {
        Self { min }
    }

    pub fn bound(&self) -> f64 {
        self.min
    }
}

impl ConstraintValidator for Min {
    fn name(&self) -> &str {
        "min"
    }

    fn validate(&self, value: &Value, _args: &ValidationArguments) -> Verdict {
        Verdict::from(value.as_f64().is_some_and(|number| number >= self.min))
    }

    fn default_message(&self, each_prefix: &str, _args: &ValidationArguments) -> String {
        format!("{}$property must not be less than $constraint1", each_prefix)
    }

    fn arguments(&self) -> Vec<serde_json::Value> {
        vec![json!(self.min)]
    }
}

/// Number must be less than or equal to the bound
#[derive(Debug, Clone, Copy)]
pub struct Max {
    max: f64,
}

impl Max {
    pub fn new(max: f64) -> Self {
        Self { max }
    }

    pub fn bound(&self) -> f64 {
        self.max
    }
}

impl ConstraintValidator for Max {
    fn name(&self) -> &str {
        "max"
    }

    fn validate(&self, value: &Value, _args: &ValidationArguments) -> Verdict {
        Verdict::from(value.as_f64().is_some_and(|number| number <= self.max))
    }

    fn default_message(&self, each_prefix: &str, _args: &ValidationArguments) -> String {
        format!("{}$property must not be greater than $constraint1", each_prefix)
    }

    fn arguments(&self) -> Vec<serde_json::Value> {
        vec![json!(self.max)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Instance;

    fn args() -> ValidationArguments {
        ValidationArguments {
            value: Value::Undefined,
            constraints: Vec::new(),
            target_name: "Post".to_string(),
            object: Instance::new("Post"),
            property: "views".to_string(),
        }
    }

    #[tokio::test]
    async fn test_min_validator() {
        let min = Min::new(0.0);
        let args = args();

        assert_eq!(min.validate(&Value::from(56), &args).resolve().await, Ok(true));
        assert_eq!(min.validate(&Value::from(0), &args).resolve().await, Ok(true));
        assert_eq!(min.validate(&Value::from(-1), &args).resolve().await, Ok(false));
        // Non-numbers never satisfy a bound
        assert_eq!(min.validate(&Value::from("56"), &args).resolve().await, Ok(false));
        assert_eq!(min.validate(&Value::Undefined, &args).resolve().await, Ok(false));
    }

    #[tokio::test]
    async fn test_max_validator() {
        let max = Max::new(10.5);
        let args = args();

        assert_eq!(max.validate(&Value::from(10.5), &args).resolve().await, Ok(true));
        assert_eq!(max.validate(&Value::from(11), &args).resolve().await, Ok(false));
        assert_eq!(max.arguments(), vec![json!(10.5)]);
    }
}
