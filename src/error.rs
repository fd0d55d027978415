use thiserror::Error;

/// Conditions that abort a translation. Everything else degrades and is logged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TranslateError {
    #[error("pool index {index} out of range, diagram has {available} pool(s)")]
    PoolNotFound { index: usize, available: usize },

    #[error("subprocess {id} exceeds the maximum nesting depth of {limit}")]
    NestingTooDeep { id: String, limit: usize },
}
