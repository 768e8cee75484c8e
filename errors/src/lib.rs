//! # Sparks Errors
//!
//! Error taxonomy shared by the normalizer, the capture workflow, the record
//! stores and the HTTP layer.
//!
//! - [`CompletionError`]: the completion endpoint failed. Rate limiting is a
//!   distinct variant so callers can tell the user to wait.
//! - [`NormalizeError`]: completion failed, or its output could not be parsed.
//! - [`StoreError`]: persistence failure.
//! - [`CaptureError`]: everything the capture workflow can surface, including
//!   user-correctable validation failures.
//!
//! None of these are retried automatically.

use thiserror::Error;

/// Longest slice of model output carried in a diagnostic.
pub const DIAGNOSTIC_PREFIX_CHARS: usize = 200;

/// Failure of the hosted completion endpoint.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompletionError {
    #[error("Completion service rate limited: {message}")]
    RateLimited {
        retry_after: Option<u64>,
        message: String,
    },

    #[error("Completion service error: {reason}")]
    Upstream { status: Option<u16>, reason: String },
}

impl CompletionError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    pub fn retry_after(&self) -> Option<u64> {
        match self {
            Self::RateLimited { retry_after, .. } => *retry_after,
            Self::Upstream { .. } => None,
        }
    }
}

/// Failure of the raw-text-to-structure pipeline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error(transparent)]
    Upstream(#[from] CompletionError),

    #[error("Completion returned invalid JSON: {prefix}")]
    MalformedResponse { prefix: String },
}

impl NormalizeError {
    /// Builds a malformed-response error carrying at most
    /// [`DIAGNOSTIC_PREFIX_CHARS`] characters of `raw`.
    pub fn malformed(raw: &str) -> Self {
        Self::MalformedResponse {
            prefix: bounded_prefix(raw, DIAGNOSTIC_PREFIX_CHARS),
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Upstream(e) if e.is_rate_limited())
    }
}

/// Persistence failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Store backend failed: {reason}")]
    Backend { reason: String },
}

impl StoreError {
    pub fn backend(reason: impl Into<String>) -> Self {
        Self::Backend {
            reason: reason.into(),
        }
    }
}

/// Errors surfaced by the capture workflow.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("Missing required field: {field}")]
    Validation { field: &'static str },

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CaptureError {
    pub fn validation(field: &'static str) -> Self {
        Self::Validation { field }
    }
}

/// First `max_chars` characters of `text`, never splitting a code point.
pub fn bounded_prefix(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
