//! Validation execution engine
//!
//! The walker enumerates an instance's properties and recurses into nested
//! objects, the evaluator runs individual constraints, the whitelist pass
//! strips or reports undeclared properties and the aggregator merges
//! everything into one error tree per instance.

mod aggregate;
mod evaluator;
mod walker;
mod whitelist;

pub(crate) use walker::Executor;

/// Whether constraints may suspend during this call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExecutionMode {
    Async,
    /// Pending verdicts are rejected instead of awaited
    Sync,
}
