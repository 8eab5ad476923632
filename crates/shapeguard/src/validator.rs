//! Entry points for validating instances

use crate::engine::{ExecutionMode, Executor};
use crate::error::{ValidationError, ValidatorError, ValidatorResult};
use crate::metadata::{metadata_store, MetadataStore};
use crate::options::ValidatorOptions;
use crate::value::Instance;
use futures::FutureExt;
use std::sync::Arc;

/// Validates instances against the declarations of a metadata store
#[derive(Debug, Clone)]
pub struct Validator {
    store: Arc<MetadataStore>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Validator backed by the process-wide store
    pub fn new() -> Self {
        Self::with_store(metadata_store())
    }

    pub fn with_store(store: Arc<MetadataStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<MetadataStore> {
        &self.store
    }

    /// Validate `instance` and return every recorded violation.
    ///
    /// An empty list means the instance is valid. With `whitelist` set and
    /// `forbid_non_whitelisted` unset, disallowed properties are removed from
    /// the instance and its nested objects as a side effect.
    pub async fn validate(
        &self,
        instance: &Instance,
        options: &ValidatorOptions,
    ) -> ValidatorResult<Vec<ValidationError>> {
        let class = instance.class_name().unwrap_or_default();
        tracing::debug!(class, whitelist = options.whitelist, "validation started");

        let executor = Executor::new(&self.store, options, ExecutionMode::Async);
        let errors = executor.run(instance).await?;

        tracing::debug!(class, errors = errors.len(), "validation finished");
        Ok(errors)
    }

    /// Validate without suspending.
    ///
    /// Fails with [`ValidatorError::AsyncConstraintInSyncMode`] before evaluating
    /// anything of an object that declares an asynchronous constraint.
    pub fn validate_sync(
        &self,
        instance: &Instance,
        options: &ValidatorOptions,
    ) -> ValidatorResult<Vec<ValidationError>> {
        let class = instance.class_name().unwrap_or_default();
        tracing::debug!(class, whitelist = options.whitelist, "synchronous validation started");

        let executor = Executor::new(&self.store, options, ExecutionMode::Sync);
        let errors = executor
            .run(instance)
            .now_or_never()
            .ok_or(ValidatorError::SyncExecutionSuspended)??;

        tracing::debug!(class, errors = errors.len(), "synchronous validation finished");
        Ok(errors)
    }

    /// Validate and turn any violation into [`ValidatorError::Rejected`]
    pub async fn validate_or_reject(&self, instance: &Instance, options: &ValidatorOptions) -> ValidatorResult<()> {
        let errors = self.validate(instance, options).await?;
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidatorError::Rejected(errors))
        }
    }
}

/// Validate against the process-wide store
pub async fn validate(instance: &Instance, options: &ValidatorOptions) -> ValidatorResult<Vec<ValidationError>> {
    Validator::new().validate(instance, options).await
}

/// Validate against the process-wide store without suspending
pub fn validate_sync(instance: &Instance, options: &ValidatorOptions) -> ValidatorResult<Vec<ValidationError>> {
    Validator::new().validate_sync(instance, options)
}

/// Validate against the process-wide store, rejecting on any violation
pub async fn validate_or_reject(instance: &Instance, options: &ValidatorOptions) -> ValidatorResult<()> {
    Validator::new().validate_or_reject(instance, options).await
}
