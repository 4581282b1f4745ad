//! Structured error types shared across the BBN crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`BbnError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (step index, species name, sizes, etc.).
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

/// Canonical error type for the kinetics engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum BbnError {
    /// Invalid run configuration detected before the evolution starts.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Numerical divergence of the evolution (fatal).
    #[error("divergence: {0}")]
    Divergence(ErrorInfo),
    /// Failure reported by an external collision integral.
    #[error("collision error: {0}")]
    Collision(ErrorInfo),
    /// Worker pool construction or dispatch failure.
    #[error("executor error: {0}")]
    Executor(ErrorInfo),
    /// Serialization, persistence and schema errors.
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

impl BbnError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            BbnError::Config(info)
            | BbnError::Divergence(info)
            | BbnError::Collision(info)
            | BbnError::Executor(info)
            | BbnError::Serde(info) => info,
        }
    }

    /// Returns a copy of the error with an extra context entry attached.
    pub fn with_context(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        match self {
            BbnError::Config(info) => BbnError::Config(info.with_context(key, value)),
            BbnError::Divergence(info) => BbnError::Divergence(info.with_context(key, value)),
            BbnError::Collision(info) => BbnError::Collision(info.with_context(key, value)),
            BbnError::Executor(info) => BbnError::Executor(info.with_context(key, value)),
            BbnError::Serde(info) => BbnError::Serde(info.with_context(key, value)),
        }
    }

    /// Shorthand for a configuration error.
    pub fn config(code: &str, message: impl Into<String>) -> Self {
        BbnError::Config(ErrorInfo::new(code, message))
    }

    /// Shorthand for a divergence error.
    pub fn divergence(code: &str, message: impl Into<String>) -> Self {
        BbnError::Divergence(ErrorInfo::new(code, message))
    }
}
