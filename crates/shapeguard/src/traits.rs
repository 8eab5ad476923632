//! Core constraint traits

use crate::error::PredicateFault;
use crate::value::{Instance, Value};
use async_trait::async_trait;
use futures::future::{self, BoxFuture, Either};
use std::future::Future;
use std::sync::Arc;

/// Outcome of a single predicate call
pub type PredicateResult = Result<bool, PredicateFault>;

/// Context passed to a constraint while it checks a value
#[derive(Debug, Clone)]
pub struct ValidationArguments {
    /// The property value being validated
    pub value: Value,
    /// Constraint arguments as declared, e.g. the bound of `min`
    pub constraints: Vec<serde_json::Value>,
    /// Class name of the object owning the property
    pub target_name: String,
    /// The object owning the property
    pub object: Instance,
    /// Name of the property being validated
    pub property: String,
}

/// Value-or-pending result of a predicate.
///
/// Synchronous constraints answer with `Ready`; asynchronous ones hand back a
/// boxed future that the engine awaits.
pub enum Verdict {
    Ready(PredicateResult),
    Pending(BoxFuture<'static, PredicateResult>),
}

impl Verdict {
    pub fn pass() -> Self {
        Verdict::Ready(Ok(true))
    }

    pub fn fail() -> Self {
        Verdict::Ready(Ok(false))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Verdict::Pending(_))
    }

    /// Await the verdict regardless of how it was produced
    pub fn resolve(self) -> impl Future<Output = PredicateResult> + Send {
        match self {
            Verdict::Ready(result) => Either::Left(future::ready(result)),
            Verdict::Pending(pending) => Either::Right(pending),
        }
    }
}

impl From<bool> for Verdict {
    fn from(passed: bool) -> Self {
        Verdict::Ready(Ok(passed))
    }
}

impl From<PredicateResult> for Verdict {
    fn from(result: PredicateResult) -> Self {
        Verdict::Ready(result)
    }
}

impl std::fmt::Debug for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Ready(result) => f.debug_tuple("Ready").field(result).finish(),
            Verdict::Pending(_) => f.write_str("Pending"),
        }
    }
}

/// Uniform interface every constraint implements
pub trait ConstraintValidator: Send + Sync {
    /// Constraint kind, used as the key of recorded messages
    fn name(&self) -> &str;

    /// Check a single value
    fn validate(&self, value: &Value, args: &ValidationArguments) -> Verdict;

    /// Message template used when the declaration has no custom message.
    /// `each_prefix` is `"each value in "` for per-element declarations.
    fn default_message(&self, each_prefix: &str, args: &ValidationArguments) -> String;

    /// Arguments exposed to messages as `$constraint1..N`
    fn arguments(&self) -> Vec<serde_json::Value> {
        Vec::new()
    }

    /// Whether `validate` may return `Verdict::Pending`
    fn is_async(&self) -> bool {
        false
    }
}

/// Convenience trait for constraints whose check is naturally asynchronous
#[async_trait]
pub trait AsyncConstraintValidator: Send + Sync + 'static {
    fn name(&self) -> &str;

    async fn validate(&self, value: &Value, args: &ValidationArguments) -> PredicateResult;

    fn default_message(&self, each_prefix: &str, args: &ValidationArguments) -> String;

    fn arguments(&self) -> Vec<serde_json::Value> {
        Vec::new()
    }
}

/// Adapter exposing an [`AsyncConstraintValidator`] as a [`ConstraintValidator`]
pub struct AsyncConstraint<C> {
    inner: Arc<C>,
}

impl<C: AsyncConstraintValidator> AsyncConstraint<C> {
    pub fn new(constraint: C) -> Self {
        Self {
            inner: Arc::new(constraint),
        }
    }
}

impl<C: AsyncConstraintValidator> ConstraintValidator for AsyncConstraint<C> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn validate(&self, value: &Value, args: &ValidationArguments) -> Verdict {
        let inner = Arc::clone(&self.inner);
        let value = value.clone();
        let args = args.clone();
        Verdict::Pending(Box::pin(async move { inner.validate(&value, &args).await }))
    }

    fn default_message(&self, each_prefix: &str, args: &ValidationArguments) -> String {
        self.inner.default_message(each_prefix, args)
    }

    fn arguments(&self) -> Vec<serde_json::Value> {
        self.inner.arguments()
    }

    fn is_async(&self) -> bool {
        true
    }
}

/// Runtime predicate over the enclosing object, used by conditional
/// validation and conditional whitelisting. Evaluated on every call.
pub trait Condition: Send + Sync {
    fn evaluate(&self, instance: &Instance) -> PredicateResult;
}

impl<F> Condition for F
where
    F: Fn(&Instance) -> bool + Send + Sync,
{
    fn evaluate(&self, instance: &Instance) -> PredicateResult {
        Ok(self(instance))
    }
}

/// Condition backed by a closure that can fail
pub struct FallibleCondition<F> {
    condition: F,
}

impl<F> FallibleCondition<F>
where
    F: Fn(&Instance) -> PredicateResult + Send + Sync,
{
    pub fn new(condition: F) -> Self {
        Self { condition }
    }
}

impl<F> Condition for FallibleCondition<F>
where
    F: Fn(&Instance) -> PredicateResult + Send + Sync,
{
    fn evaluate(&self, instance: &Instance) -> PredicateResult {
        (self.condition)(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    struct SlowUnique;

    #[async_trait]
    impl AsyncConstraintValidator for SlowUnique {
        fn name(&self) -> &str {
            "isUnique"
        }

        async fn validate(&self, value: &Value, _args: &ValidationArguments) -> PredicateResult {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok(value.as_str() != Some("taken"))
        }

        fn default_message(&self, each_prefix: &str, _args: &ValidationArguments) -> String {
            format!("{}$property must be unique", each_prefix)
        }
    }

    fn arguments(value: Value) -> ValidationArguments {
        ValidationArguments {
            value,
            constraints: Vec::new(),
            target_name: "User".to_string(),
            object: Instance::new("User"),
            property: "login".to_string(),
        }
    }

    #[tokio::test]
    async fn test_async_adapter_returns_pending() {
        let constraint = AsyncConstraint::new(SlowUnique);
        let args = arguments(Value::from("taken"));

        assert!(constraint.is_async());
        let verdict = constraint.validate(&args.value, &args);
        assert!(verdict.is_pending());
        assert_eq!(verdict.resolve().await, Ok(false));
    }

    #[tokio::test]
    async fn test_ready_verdict_resolves_immediately() {
        assert_eq!(Verdict::pass().resolve().await, Ok(true));
        assert_eq!(Verdict::from(false).resolve().await, Ok(false));
    }

    #[test]
    fn test_closure_and_fallible_conditions() {
        let instance = Instance::new("Flags").with("flag", true);
        let by_flag = |o: &Instance| o.get("flag").as_bool() == Some(true);
        assert_eq!(by_flag.evaluate(&instance), Ok(true));

        let broken = FallibleCondition::new(|_: &Instance| Err(PredicateFault::new("boom")));
        assert!(broken.evaluate(&instance).is_err());
    }
}
