//! Structured error types shared across OPEST crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`OpestError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (qubits, term ids, shot counts, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the estimation stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum OpestError {
    /// An operand of the wrong shape was supplied (scalar, term, or sum mismatch).
    #[error("type error: {0}")]
    Type(ErrorInfo),
    /// Terms cannot be measured together in one diagonal basis.
    #[error("commutation error: {0}")]
    Commutation(ErrorInfo),
    /// Malformed Pauli algebra input (unknown operator labels, bad factor lists).
    #[error("algebra error: {0}")]
    Algebra(ErrorInfo),
    /// Failure reported by the execution backend.
    #[error("backend error: {0}")]
    Backend(ErrorInfo),
    /// Sampling or numeric failure inside the estimator.
    #[error("estimate error: {0}")]
    Estimate(ErrorInfo),
    /// Invalid configuration values.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl OpestError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            OpestError::Type(info)
            | OpestError::Commutation(info)
            | OpestError::Algebra(info)
            | OpestError::Backend(info)
            | OpestError::Estimate(info)
            | OpestError::Config(info)
            | OpestError::Serde(info) => info,
        }
    }

    /// Returns the stable error code of the payload.
    pub fn code(&self) -> &str {
        &self.info().code
    }

    /// Adds a context entry while keeping the error family.
    pub fn with_context(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        match self {
            OpestError::Type(info) => OpestError::Type(info.with_context(key, value)),
            OpestError::Commutation(info) => OpestError::Commutation(info.with_context(key, value)),
            OpestError::Algebra(info) => OpestError::Algebra(info.with_context(key, value)),
            OpestError::Backend(info) => OpestError::Backend(info.with_context(key, value)),
            OpestError::Estimate(info) => OpestError::Estimate(info.with_context(key, value)),
            OpestError::Config(info) => OpestError::Config(info.with_context(key, value)),
            OpestError::Serde(info) => OpestError::Serde(info.with_context(key, value)),
        }
    }
}
