// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Serbench Core Library
//!
//! Concurrent benchmark orchestration for serialization codecs.
//! Provides the codec adapter contract and built-in formats, the per-phase
//! benchmark runner, the pipeline scheduler and state machine, sample
//! generation, scratch storage and configuration parsing.

pub mod codec;
pub mod config;
pub mod error;
pub mod harness;
pub mod registry;
pub mod runner;
pub mod samples;
pub mod scheduler;
pub mod state;
pub mod stats;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use codec::{CodecAdapter, CodecContext, CodecFactory, CodecRegistry, Format};
pub use config::{BenchmarkConfig, Config, ConfigLoader, SampleSpec};
pub use error::{
    BenchError, BenchResult, CodecError, CodecResult, FailureEvent, HardValidationError,
    StateTransitionError, TaggedError,
};
pub use registry::PipelineRegistry;
pub use runner::BenchmarkRunner;
pub use samples::{Sample, SampleGenerator};
pub use scheduler::{PipelineResult, Scheduler};
pub use state::{PipelineSnapshot, PipelineState, PipelineStateMachine};
pub use stats::{LatencyMetrics, PhaseStats, SampleStat};
pub use storage::ScratchStore;
pub use types::{FormatId, Phase, TrialCount};
