//! Custom error types for serbench.
//!
//! This module defines explicit enum error types.
//! No `Box<dyn Error>`, no `anyhow::Result` - all errors are strongly typed.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{FormatId, Phase};

/// Top-level error type for configuration and orchestration setup.
/// Codec failures during a run never surface here; they are recorded per format.
#[derive(Debug, Error)]
pub enum BenchError {
    // =========================================================================
    // Configuration Errors - Fail-Fast on Invalid Config
    // =========================================================================
    #[error("Hard validation error: {0}")]
    HardValidation(#[from] HardValidationError),

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String },

    // =========================================================================
    // Pipeline Errors
    // =========================================================================
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(#[from] StateTransitionError),

    #[error("Unknown format: {0}")]
    UnknownFormat(String),

    #[error("Pipeline not found: {0}")]
    PipelineNotFound(FormatId),

    #[error("Pipeline already exists: {0}")]
    PipelineAlreadyExists(FormatId),

    // =========================================================================
    // System Errors
    // =========================================================================
    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Hard validation errors stop a run before any pipeline starts.
#[derive(Debug, Error)]
pub enum HardValidationError {
    #[error("Missing required field: {field} in {context}")]
    MissingRequiredField {
        field: &'static str,
        context: String,
    },

    #[error("Invalid field value: {field} = {value} - {reason}")]
    InvalidFieldValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Duplicate format: {id}")]
    DuplicateFormat { id: String },

    #[error("Unknown sample struct id: {struct_id}")]
    UnknownStruct { struct_id: u32 },

    #[error("Schema validation failed: {message}")]
    SchemaValidation { message: String },
}

/// State transition errors for the pipeline state machine.
#[derive(Debug, Error)]
pub enum StateTransitionError {
    #[error("Cannot transition from {from} to {to} for format {format}")]
    InvalidTransition {
        format: FormatId,
        from: &'static str,
        to: &'static str,
    },

    #[error("Format {format} is in terminal state: {state}")]
    TerminalState {
        format: FormatId,
        state: &'static str,
    },
}

/// Failure raised by a codec adapter or by the runner while measuring it.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("initialization failed: {reason}")]
    Init { reason: String },

    #[error("encode failed for sample {sample_index}: {reason}")]
    Encode { sample_index: usize, reason: String },

    #[error("decode failed for sample {sample_index}: {reason}")]
    Decode { sample_index: usize, reason: String },

    #[error("scratch storage error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("benchmark task panicked: {reason}")]
    Panicked { reason: String },
}

impl CodecError {
    /// Short taxonomy name used in reports.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Init { .. } => "InitError",
            Self::Encode { .. } => "EncodeError",
            Self::Decode { .. } => "DecodeError",
            Self::Io { .. } => "IOError",
            Self::Panicked { .. } => "Panicked",
        }
    }
}

/// A codec failure tagged with the format and phase it came from.
#[derive(Debug, Error)]
#[error("{format} {phase} failed: {error}")]
pub struct TaggedError {
    pub format: FormatId,
    pub phase: Phase,
    #[source]
    pub error: CodecError,
}

impl TaggedError {
    pub fn new(format: FormatId, phase: Phase, error: CodecError) -> Self {
        Self {
            format,
            phase,
            error,
        }
    }
}

/// Failures observed in one scheduler completion event.
///
/// A single job failing yields `Single`; several jobs resolving with errors
/// in the same wake-up yield `Batch`. Both are handled identically.
#[derive(Debug)]
pub enum FailureEvent {
    Single(TaggedError),
    Batch(Vec<TaggedError>),
}

impl FailureEvent {
    /// Build an event from collected failures, `None` when there are none.
    pub fn from_failures(mut failures: Vec<TaggedError>) -> Option<Self> {
        match failures.len() {
            0 => None,
            1 => failures.pop().map(Self::Single),
            _ => Some(Self::Batch(failures)),
        }
    }

    /// Normalize to a uniform list.
    pub fn into_errors(self) -> Vec<TaggedError> {
        match self {
            Self::Single(error) => vec![error],
            Self::Batch(errors) => errors,
        }
    }
}

/// Result type alias using BenchError.
pub type BenchResult<T> = Result<T, BenchError>;

/// Result type alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(name: &str) -> TaggedError {
        TaggedError::new(
            FormatId::new(name).unwrap(),
            Phase::Serialize,
            CodecError::Encode {
                sample_index: 0,
                reason: "boom".to_string(),
            },
        )
    }

    #[test]
    fn test_hard_validation_error_display() {
        let err = HardValidationError::MissingRequiredField {
            field: "trials",
            context: "benchmark section".to_string(),
        };
        assert!(err.to_string().contains("trials"));
        assert!(err.to_string().contains("benchmark section"));
    }

    #[test]
    fn test_error_chain() {
        let validation_err = HardValidationError::DuplicateFormat {
            id: "JSON".to_string(),
        };
        let bench_err: BenchError = validation_err.into();
        assert!(matches!(bench_err, BenchError::HardValidation(_)));
    }

    #[test]
    fn test_tagged_error_display() {
        let err = tagged("XML");
        let message = err.to_string();
        assert!(message.contains("XML"));
        assert!(message.contains("serialize"));
        assert!(message.contains("boom"));
        assert_eq!(err.error.kind(), "EncodeError");
    }

    #[test]
    fn test_failure_event_normalizes_both_shapes() {
        assert!(FailureEvent::from_failures(Vec::new()).is_none());

        let single = FailureEvent::from_failures(vec![tagged("A")]).unwrap();
        assert!(matches!(single, FailureEvent::Single(_)));
        assert_eq!(single.into_errors().len(), 1);

        let batch = FailureEvent::from_failures(vec![tagged("A"), tagged("B")]).unwrap();
        assert!(matches!(batch, FailureEvent::Batch(_)));
        let formats: Vec<_> = batch
            .into_errors()
            .into_iter()
            .map(|e| e.format.to_string())
            .collect();
        assert_eq!(formats, vec!["A", "B"]);
    }
}
