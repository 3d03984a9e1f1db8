//! Error types for normalization, policy handling and provider calls.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while turning raw parameters into a desired spec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required parameter: {0}")]
    Missing(&'static str),

    #[error("parameter {field} must be {expected}, got {value}")]
    InvalidType {
        field: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("parameter {field} must be within {min}..={max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
        value: i64,
    },

    #[error("parameter access_policies is not a valid JSON object: {0}")]
    InvalidPolicy(String),
}

/// Errors raised while loading a params file.
#[derive(Debug, Error)]
pub enum ParamsFileError {
    #[error("failed to read params file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("params file {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("params file {path}: {source}")]
    Params {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },
}

/// Invalid provider connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    #[error("{given} was set without {missing}; static credentials need both")]
    IncompleteCredentials {
        given: &'static str,
        missing: &'static str,
    },
}

/// Errors raised for access policy documents that cannot be sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("Failed to convert the policy into valid JSON: {0}")]
    Malformed(String),
}

/// Error reported by the provider for anything other than a missing domain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct ProviderError {
    pub code: String,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Provider operation that failed during a reconcile run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Describe,
    Create,
    Update,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Operation::Describe => "describe",
            Operation::Create => "create",
            Operation::Update => "update",
        };
        f.write_str(s)
    }
}

/// Errors that end a reconcile run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error("{op} failed: {source}")]
    Provider {
        op: Operation,
        #[source]
        source: ProviderError,
    },

    #[error("domain {0} disappeared before its state could be read back")]
    Vanished(String),
}

impl ReconcileError {
    pub fn provider(op: Operation, source: ProviderError) -> Self {
        ReconcileError::Provider { op, source }
    }
}

/// Result type for reconcile internals.
pub type Result<T> = std::result::Result<T, ReconcileError>;
