// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Concurrent scheduler for codec pipelines.
//!
//! Every codec gets one serialize job up front. The scheduler waits for the
//! next job to resolve (whichever finishes first), collects any others that
//! already finished in the same wake-up, and then:
//!
//! - on serialize success, records the stats and starts deserialize
//! - on deserialize success, records the completed pipeline
//! - on failure, marks the format Failed and never schedules it again
//!
//! A failure never cancels or delays another format. The run always drains
//! to a result for every registered format.

use std::collections::{BTreeMap, HashMap};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::task::{JoinError, JoinSet};

use crate::codec::CodecAdapter;
use crate::error::{CodecError, FailureEvent, TaggedError};
use crate::registry::PipelineRegistry;
use crate::runner::{panic_message, BenchmarkRunner};
use crate::samples::Sample;
use crate::state::PipelineState;
use crate::stats::PhaseStats;
use crate::types::{FormatId, Phase};

/// Final outcome for one format.
#[derive(Debug)]
pub enum PipelineResult {
    /// Both phases succeeded. Each list holds one entry per sample.
    Completed {
        serialize: PhaseStats,
        deserialize: PhaseStats,
    },
    /// The first failure the format hit. No stats from a failed pipeline are kept.
    Failed(TaggedError),
}

impl PipelineResult {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    pub fn stats(&self, phase: Phase) -> Option<&PhaseStats> {
        match (self, phase) {
            (Self::Completed { serialize, .. }, Phase::Serialize) => Some(serialize),
            (Self::Completed { deserialize, .. }, Phase::Deserialize) => Some(deserialize),
            (Self::Failed(_), _) => None,
        }
    }

    pub fn error(&self) -> Option<&TaggedError> {
        match self {
            Self::Failed(error) => Some(error),
            Self::Completed { .. } => None,
        }
    }
}

/// What a successful job hands back to the scheduler.
enum JobOutput {
    /// Serialize finished; the initialized adapter is reused for deserialize.
    Serialized {
        codec: Arc<dyn CodecAdapter>,
        stats: PhaseStats,
    },
    Deserialized { stats: PhaseStats },
}

/// One resolved (format, phase) job.
struct JobResult {
    format: FormatId,
    phase: Phase,
    output: Result<JobOutput, CodecError>,
}

pub struct Scheduler {
    runner: BenchmarkRunner,
    registry: Arc<PipelineRegistry>,
}

impl Scheduler {
    pub fn new(runner: BenchmarkRunner) -> Self {
        Self {
            runner,
            registry: PipelineRegistry::new_shared(),
        }
    }

    /// Shared view of pipeline states, for progress reporting.
    pub fn registry(&self) -> Arc<PipelineRegistry> {
        Arc::clone(&self.registry)
    }

    /// Run every codec through serialize then deserialize.
    ///
    /// Adapters are passed uninitialized; initialization happens inside the
    /// serialize job, so an init failure fails only that format. A codec
    /// whose format was already seen in this run is skipped.
    pub async fn run(
        self,
        codecs: Vec<Box<dyn CodecAdapter>>,
        samples: Arc<[Sample]>,
    ) -> BTreeMap<FormatId, PipelineResult> {
        let mut pipelines = Pipelines::new(self.runner, Arc::clone(&self.registry), samples);

        for codec in codecs {
            let format = codec.format().clone();
            if let Err(e) = self.registry.register(format.clone()) {
                tracing::warn!(format = %format, error = %e, "Skipping duplicate codec");
                continue;
            }
            pipelines.start_serialize(codec);
        }

        tracing::info!(
            pipelines = self.registry.len(),
            samples = pipelines.samples.len(),
            trials = %self.runner.trials(),
            "Benchmark started"
        );

        pipelines.drain().await;
        pipelines.fail_unfinished();

        let completed = pipelines
            .results
            .values()
            .filter(|result| result.is_completed())
            .count();
        tracing::info!(
            completed,
            failed = pipelines.results.len() - completed,
            "Benchmark finished"
        );

        pipelines.results
    }
}

/// Mutable state of one scheduler run.
struct Pipelines {
    runner: BenchmarkRunner,
    registry: Arc<PipelineRegistry>,
    samples: Arc<[Sample]>,
    jobs: JoinSet<JobResult>,
    /// Serialize stats held until the format's deserialize job resolves.
    serialized: HashMap<FormatId, PhaseStats>,
    results: BTreeMap<FormatId, PipelineResult>,
}

impl Pipelines {
    fn new(
        runner: BenchmarkRunner,
        registry: Arc<PipelineRegistry>,
        samples: Arc<[Sample]>,
    ) -> Self {
        Self {
            runner,
            registry,
            samples,
            jobs: JoinSet::new(),
            serialized: HashMap::new(),
            results: BTreeMap::new(),
        }
    }

    /// Wait for jobs until none are left. Each wake-up takes the first
    /// resolved job plus every other job that already resolved.
    async fn drain(&mut self) {
        while let Some(first) = self.jobs.join_next().await {
            let mut batch = vec![first];
            while let Some(next) = self.jobs.try_join_next() {
                batch.push(next);
            }
            self.process(batch);
        }
    }

    /// Advance every success in the batch, then evict its failures together.
    fn process(&mut self, batch: Vec<Result<JobResult, JoinError>>) {
        let mut failures = Vec::new();
        for joined in batch {
            match joined {
                Ok(job) => {
                    if let Some(failure) = self.complete(job) {
                        failures.push(failure);
                    }
                }
                // Jobs catch their own panics; only cancellation lands here.
                Err(e) => tracing::error!(error = %e, "Benchmark job lost"),
            }
        }

        if let Some(event) = FailureEvent::from_failures(failures) {
            self.evict(event);
        }
    }

    fn start_serialize(&mut self, codec: Box<dyn CodecAdapter>) {
        let format = codec.format().clone();
        record(&self.registry, &format, PipelineState::PendingSerialize);

        let runner = self.runner;
        let registry = Arc::clone(&self.registry);
        let samples = Arc::clone(&self.samples);

        self.jobs.spawn(async move {
            record(&registry, &format, PipelineState::RunningSerialize);
            let work = async move {
                let mut codec = codec;
                codec.initialize().await?;
                let codec: Arc<dyn CodecAdapter> = Arc::from(codec);
                let stats = runner
                    .run(Arc::clone(&codec), Phase::Serialize, samples)
                    .await?;
                Ok::<_, CodecError>(JobOutput::Serialized { codec, stats })
            };
            JobResult {
                output: guard(work).await,
                phase: Phase::Serialize,
                format,
            }
        });
    }

    fn start_deserialize(&mut self, format: FormatId, codec: Arc<dyn CodecAdapter>) {
        record(&self.registry, &format, PipelineState::PendingDeserialize);

        let runner = self.runner;
        let registry = Arc::clone(&self.registry);
        let samples = Arc::clone(&self.samples);

        self.jobs.spawn(async move {
            record(&registry, &format, PipelineState::RunningDeserialize);
            let work = async move {
                let stats = runner.run(codec, Phase::Deserialize, samples).await?;
                Ok::<_, CodecError>(JobOutput::Deserialized { stats })
            };
            JobResult {
                output: guard(work).await,
                phase: Phase::Deserialize,
                format,
            }
        });
    }

    /// Apply a resolved job. Failures are returned for batch eviction.
    fn complete(&mut self, job: JobResult) -> Option<TaggedError> {
        let JobResult {
            format,
            phase,
            output,
        } = job;

        match output {
            Ok(JobOutput::Serialized { codec, stats }) => {
                tracing::info!(format = %format, samples = stats.len(), "Serialize complete");
                record(&self.registry, &format, PipelineState::DoneSerialize);
                self.serialized.insert(format.clone(), stats);
                self.start_deserialize(format, codec);
                None
            }
            Ok(JobOutput::Deserialized { stats }) => {
                tracing::info!(format = %format, samples = stats.len(), "Deserialize complete");
                record(&self.registry, &format, PipelineState::Done);
                let serialize = self.serialized.remove(&format).unwrap_or_default();
                self.results.insert(
                    format,
                    PipelineResult::Completed {
                        serialize,
                        deserialize: stats,
                    },
                );
                None
            }
            Err(error) => Some(TaggedError::new(format, phase, error)),
        }
    }

    /// Drop every failed format from all further scheduling.
    fn evict(&mut self, event: FailureEvent) {
        for failure in event.into_errors() {
            tracing::warn!(
                format = %failure.format,
                phase = %failure.phase,
                kind = failure.error.kind(),
                error = %failure.error,
                "Pipeline failed"
            );
            if let Err(e) = self.registry.fail(&failure.format) {
                tracing::error!(format = %failure.format, error = %e, "Failed to record failure");
            }
            self.serialized.remove(&failure.format);
            self.results
                .insert(failure.format.clone(), PipelineResult::Failed(failure));
        }
    }

    /// Fail any format whose job vanished without resolving.
    fn fail_unfinished(&mut self) {
        let failures: Vec<_> = self
            .registry
            .unfinished()
            .into_iter()
            .map(|format| {
                let phase = self
                    .registry
                    .get_state(&format)
                    .ok()
                    .and_then(|state| state.active_phase())
                    .unwrap_or(Phase::Serialize);
                TaggedError::new(
                    format,
                    phase,
                    CodecError::Panicked {
                        reason: "job ended without a result".to_string(),
                    },
                )
            })
            .collect();

        if let Some(event) = FailureEvent::from_failures(failures) {
            self.evict(event);
        }
    }
}

/// Run a job body, turning a panic into a codec failure.
async fn guard<F>(work: F) -> Result<JobOutput, CodecError>
where
    F: std::future::Future<Output = Result<JobOutput, CodecError>>,
{
    AssertUnwindSafe(work)
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| {
            Err(CodecError::Panicked {
                reason: panic_message(payload),
            })
        })
}

fn record(registry: &PipelineRegistry, format: &FormatId, state: PipelineState) {
    if let Err(e) = registry.transition(format, state) {
        tracing::error!(format = %format, error = %e, "Pipeline state out of sync");
    }
}
