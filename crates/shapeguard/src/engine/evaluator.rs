use super::walker::Executor;
use super::ExecutionMode;
use crate::error::{ValidationError, ValidatorError, ValidatorResult};
use crate::message;
use crate::metadata::{ConstraintDeclaration, MessageSource, Rule, EACH_PREFIX};
use crate::traits::{ConstraintValidator, PredicateResult, ValidationArguments, Verdict};
use crate::value::{Instance, Value};
use futures::future::join_all;

/// Result of one declaration against one property value
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Evaluation {
    pub passed: bool,
    pub message: Option<String>,
}

impl Evaluation {
    fn passed() -> Self {
        Self {
            passed: true,
            message: None,
        }
    }

    fn failed(message: String) -> Self {
        Self {
            passed: false,
            message: Some(message),
        }
    }
}

impl Executor<'_> {
    /// Run `checks` against `value`, recording failures on `error` in declaration order
    pub(super) async fn run_checks(
        &self,
        checks: &[&ConstraintDeclaration],
        value: &Value,
        instance: &Instance,
        property: &str,
        error: &mut ValidationError,
    ) -> ValidatorResult<()> {
        if checks.is_empty() {
            return Ok(());
        }

        if self.options.stop_at_first_error {
            for declaration in checks {
                if self.is_halted() {
                    break;
                }
                let evaluation = self.evaluate(declaration, value, instance, property).await?;
                if !evaluation.passed {
                    error
                        .constraints
                        .insert(declaration.kind(), evaluation.message.unwrap_or_default());
                    self.record_failure();
                }
            }
            return Ok(());
        }

        let evaluations = join_all(
            checks
                .iter()
                .map(|declaration| self.evaluate(declaration, value, instance, property)),
        )
        .await;

        for (declaration, evaluation) in checks.iter().zip(evaluations) {
            let evaluation = evaluation?;
            if !evaluation.passed {
                error
                    .constraints
                    .insert(declaration.kind(), evaluation.message.unwrap_or_default());
            }
        }
        Ok(())
    }

    /// Evaluate one declaration. Predicate faults count as failures unless
    /// the options ask for them to be surfaced.
    pub(super) async fn evaluate(
        &self,
        declaration: &ConstraintDeclaration,
        value: &Value,
        instance: &Instance,
        property: &str,
    ) -> ValidatorResult<Evaluation> {
        let Rule::Check(validator) = declaration.rule() else {
            return Ok(Evaluation::passed());
        };

        let args = ValidationArguments {
            value: value.clone(),
            constraints: declaration.constraint_arguments().to_vec(),
            target_name: instance.class_name().unwrap_or_default().to_string(),
            object: instance.clone(),
            property: property.to_string(),
        };

        let verdicts: Vec<Verdict> = match value.entries() {
            Some(entries) if declaration.is_each() => entries
                .into_iter()
                .map(|(_, item)| validator.validate(item, &args))
                .collect(),
            _ => vec![validator.validate(value, &args)],
        };

        let mut passed = true;
        for outcome in self.settle(verdicts, declaration, &args).await? {
            match outcome {
                Ok(true) => {}
                Ok(false) => passed = false,
                Err(fault) if self.options.surface_predicate_faults => {
                    return Err(ValidatorError::PredicateFault {
                        class: args.target_name.clone(),
                        property: property.to_string(),
                        constraint: declaration.kind().to_string(),
                        source: fault,
                    });
                }
                Err(fault) => {
                    tracing::warn!(
                        class = %args.target_name,
                        property,
                        constraint = declaration.kind(),
                        error = %fault,
                        "constraint predicate failed, recording a violation"
                    );
                    passed = false;
                }
            }
        }

        if passed {
            Ok(Evaluation::passed())
        } else {
            Ok(Evaluation::failed(self.build_message(declaration, validator.as_ref(), &args)))
        }
    }

    /// Turn verdicts into outcomes, awaiting pending ones only in async mode
    async fn settle(
        &self,
        verdicts: Vec<Verdict>,
        declaration: &ConstraintDeclaration,
        args: &ValidationArguments,
    ) -> ValidatorResult<Vec<PredicateResult>> {
        match self.mode {
            ExecutionMode::Async => Ok(join_all(verdicts.into_iter().map(Verdict::resolve)).await),
            ExecutionMode::Sync => verdicts
                .into_iter()
                .map(|verdict| match verdict {
                    Verdict::Ready(result) => Ok(result),
                    Verdict::Pending(_) => Err(ValidatorError::AsyncConstraintInSyncMode {
                        class: args.target_name.clone(),
                        property: args.property.clone(),
                        constraint: declaration.kind().to_string(),
                    }),
                })
                .collect(),
        }
    }

    fn build_message(
        &self,
        declaration: &ConstraintDeclaration,
        validator: &dyn ConstraintValidator,
        args: &ValidationArguments,
    ) -> String {
        let template = match declaration.custom_message() {
            Some(MessageSource::Text(text)) => text.clone(),
            Some(MessageSource::Builder(builder)) => builder(args),
            None if self.options.dismiss_default_messages => String::new(),
            None => {
                let prefix = if declaration.is_each() { EACH_PREFIX } else { "" };
                validator.default_message(prefix, args)
            }
        };
        message::replace_tokens(&template, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PredicateFault;
    use crate::metadata::MetadataStore;
    use crate::options::ValidatorOptions;
    use crate::validators::{CustomConstraint, IsString, Min};

    fn evaluate_with(
        options: &ValidatorOptions,
        declaration: ConstraintDeclaration,
        value: Value,
    ) -> ValidatorResult<Evaluation> {
        let store = MetadataStore::new();
        let executor = Executor::new(&store, options, ExecutionMode::Async);
        let instance = Instance::new("Post").with(declaration.property(), value.clone());
        tokio_test::block_on(executor.evaluate(&declaration, &value, &instance, declaration.property()))
    }

    #[test]
    fn test_failed_constraint_builds_default_message() {
        let declaration = ConstraintDeclaration::new("Post", "views", Rule::check(Min::new(0.0)));
        let evaluation = evaluate_with(&ValidatorOptions::default(), declaration, Value::from(-1)).unwrap();

        assert!(!evaluation.passed);
        assert_eq!(evaluation.message.as_deref(), Some("views must not be less than 0"));
    }

    #[test]
    fn test_each_applies_to_every_element() {
        let declaration =
            ConstraintDeclaration::new("Post", "tags", Rule::check(IsString)).each(true);

        let ok = evaluate_with(&ValidatorOptions::default(), declaration.clone(), Value::from(vec!["a", "b"])).unwrap();
        assert!(ok.passed);

        let bad = evaluate_with(
            &ValidatorOptions::default(),
            declaration,
            Value::List(vec![Value::from("a"), Value::from(3)]),
        )
        .unwrap();
        assert_eq!(bad.message.as_deref(), Some("each value in tags must be a string"));
    }

    #[test]
    fn test_custom_message_tokens() {
        let declaration = ConstraintDeclaration::new("Post", "views", Rule::check(Min::new(10.0)))
            .message("$property of $target was $value, expected $constraint1+");
        let evaluation = evaluate_with(&ValidatorOptions::default(), declaration, Value::from(3)).unwrap();

        assert_eq!(evaluation.message.as_deref(), Some("views of Post was 3, expected 10+"));
    }

    #[test]
    fn test_dismissed_default_message_is_empty() {
        let options = ValidatorOptions {
            dismiss_default_messages: true,
            ..ValidatorOptions::default()
        };
        let declaration = ConstraintDeclaration::new("Post", "views", Rule::check(Min::new(0.0)));
        let evaluation = evaluate_with(&options, declaration, Value::from(-1)).unwrap();

        assert_eq!(evaluation.message.as_deref(), Some(""));
    }

    #[test]
    fn test_predicate_fault_is_recorded_or_surfaced() {
        let faulty = Rule::check(CustomConstraint::fallible("lookup", |_, _| {
            Err(PredicateFault::new("backend unavailable"))
        }));
        let declaration = ConstraintDeclaration::new("Post", "slug", faulty);

        let recorded = evaluate_with(&ValidatorOptions::default(), declaration.clone(), Value::from("x")).unwrap();
        assert!(!recorded.passed);

        let options = ValidatorOptions {
            surface_predicate_faults: true,
            ..ValidatorOptions::default()
        };
        let surfaced = evaluate_with(&options, declaration, Value::from("x"));
        assert!(matches!(surfaced, Err(ValidatorError::PredicateFault { .. })));
    }
}
