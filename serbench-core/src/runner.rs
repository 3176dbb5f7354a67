// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Benchmark runner: one phase of one codec across every sample.
//!
//! Each sample is measured in its own task. Trial loops are CPU-bound and run
//! on the blocking pool; scratch I/O stays on the async runtime. The phase
//! resolves to stats for every sample, or to the first sample failure.

use std::sync::Arc;

use serde_json::Value;
use tokio::task::{JoinError, JoinSet};

use crate::codec::CodecAdapter;
use crate::error::{CodecError, CodecResult};
use crate::harness::TrialHarness;
use crate::samples::Sample;
use crate::stats::{PhaseStats, SampleStat};
use crate::types::{Phase, TrialCount};

/// Measures serialize or deserialize for a single codec.
#[derive(Debug, Clone, Copy)]
pub struct BenchmarkRunner {
    trials: TrialCount,
    warmup_trials: u64,
    verify_round_trip: bool,
}

impl BenchmarkRunner {
    pub fn new(trials: TrialCount) -> Self {
        Self {
            trials,
            warmup_trials: 0,
            verify_round_trip: true,
        }
    }

    /// Untimed iterations before measurement.
    pub fn with_warmup(mut self, warmup_trials: u64) -> Self {
        self.warmup_trials = warmup_trials;
        self
    }

    /// Compare one decoded value against the original sample after deserialize.
    pub fn with_verification(mut self, verify: bool) -> Self {
        self.verify_round_trip = verify;
        self
    }

    pub fn trials(&self) -> TrialCount {
        self.trials
    }

    fn harness(&self) -> TrialHarness {
        TrialHarness::new()
            .warmup(self.warmup_trials)
            .iterations(self.trials.value())
    }

    /// Run `phase` for every sample. Stats are sorted by sample index.
    ///
    /// Deserialize reads exactly the bytes the serialize phase persisted for
    /// each sample index, so it must only run after serialize succeeded.
    pub async fn run(
        &self,
        codec: Arc<dyn CodecAdapter>,
        phase: Phase,
        samples: Arc<[Sample]>,
    ) -> CodecResult<PhaseStats> {
        let mut tasks = JoinSet::new();
        for position in 0..samples.len() {
            let runner = *self;
            let codec = Arc::clone(&codec);
            let samples = Arc::clone(&samples);
            tasks.spawn(async move {
                match phase {
                    Phase::Serialize => runner.serialize_sample(codec, samples, position).await,
                    Phase::Deserialize => {
                        runner.deserialize_sample(codec, samples, position).await
                    }
                }
            });
        }

        let mut stats = Vec::with_capacity(samples.len());
        while let Some(joined) = tasks.join_next().await {
            // Returning drops the set, which aborts the remaining sample tasks.
            let stat = joined.map_err(task_failure)??;
            stats.push(stat);
        }

        stats.sort_by_key(|stat| stat.sample_index);
        tracing::debug!(
            format = %codec.format(),
            phase = %phase,
            samples = stats.len(),
            "Phase measured"
        );
        Ok(stats)
    }

    /// Scratch files and stats are keyed by `Sample::index`, not by the
    /// sample's position in the set.
    async fn serialize_sample(
        self,
        codec: Arc<dyn CodecAdapter>,
        samples: Arc<[Sample]>,
        position: usize,
    ) -> CodecResult<SampleStat> {
        let index = samples[position].index;
        let harness = self.harness();
        let timing_codec = Arc::clone(&codec);

        let (durations, payload) = tokio::task::spawn_blocking(move || {
            let sample = &samples[position];
            let (durations, last) = harness.run(|| timing_codec.encode(sample))?;
            let payload = match last {
                Some(payload) => payload,
                None => timing_codec.encode(sample)?,
            };
            Ok::<_, CodecError>((durations, payload))
        })
        .await
        .map_err(task_failure)??;

        codec.persist(index, &payload).await?;
        Ok(SampleStat::from_trials(index, payload.len(), durations))
    }

    async fn deserialize_sample(
        self,
        codec: Arc<dyn CodecAdapter>,
        samples: Arc<[Sample]>,
        position: usize,
    ) -> CodecResult<SampleStat> {
        let index = samples[position].index;
        let payload = codec.load(index).await?;
        let harness = self.harness();
        let verify = self.verify_round_trip;

        let (durations, size) = tokio::task::spawn_blocking(move || {
            let (durations, last) = harness.run(|| codec.decode(index, &payload))?;
            if verify {
                let decoded = match last {
                    Some(decoded) => decoded,
                    None => codec.decode(index, &payload)?,
                };
                check_round_trip(&samples[position], &decoded)?;
            }
            Ok::<_, CodecError>((durations, payload.len()))
        })
        .await
        .map_err(task_failure)??;

        Ok(SampleStat::from_trials(index, size, durations))
    }
}

fn check_round_trip(sample: &Sample, decoded: &Value) -> CodecResult<()> {
    if *decoded == sample.value {
        return Ok(());
    }
    Err(CodecError::Decode {
        sample_index: sample.index,
        reason: "decoded value differs from the original sample".to_string(),
    })
}

/// Map a task that panicked or was cancelled to a codec failure.
pub(crate) fn task_failure(error: JoinError) -> CodecError {
    let reason = if error.is_panic() {
        panic_message(error.into_panic())
    } else {
        "task cancelled".to_string()
    };
    CodecError::Panicked { reason }
}

pub(crate) fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CodecRegistry;
    use crate::samples::SampleGenerator;
    use serde_json::json;
    use tempfile::TempDir;

    fn runner(trials: u64) -> BenchmarkRunner {
        BenchmarkRunner::new(TrialCount::new(trials).unwrap())
    }

    async fn json_codec(samples: Arc<[Sample]>, root: &std::path::Path) -> Arc<dyn CodecAdapter> {
        let mut codec = CodecRegistry::builtin()
            .create("JSON", samples, root)
            .unwrap();
        codec.initialize().await.unwrap();
        Arc::from(codec)
    }

    #[tokio::test]
    async fn test_serialize_then_deserialize() {
        let temp_dir = TempDir::new().unwrap();
        let samples = SampleGenerator::new(3).generate_shared(&[1, 2, 3]).unwrap();
        let codec = json_codec(samples.clone(), temp_dir.path()).await;

        let serialized = runner(3)
            .run(Arc::clone(&codec), Phase::Serialize, samples.clone())
            .await
            .unwrap();
        assert_eq!(serialized.len(), 3);
        for (i, stat) in serialized.iter().enumerate() {
            assert_eq!(stat.sample_index, i);
            let on_disk = std::fs::read(codec.scratch().sample_path(i)).unwrap();
            assert_eq!(stat.size_bytes, on_disk.len());
        }

        let deserialized = runner(3)
            .run(codec, Phase::Deserialize, samples)
            .await
            .unwrap();
        assert_eq!(deserialized.len(), 3);
        assert_eq!(deserialized[2].size_bytes, serialized[2].size_bytes);
    }

    #[tokio::test]
    async fn test_size_is_exact_payload_length() {
        let temp_dir = TempDir::new().unwrap();
        let samples: Arc<[Sample]> = vec![Sample::new(0, 1, json!({ "x": 1 }))].into();
        let codec = json_codec(samples.clone(), temp_dir.path()).await;

        let stats = runner(1)
            .run(codec, Phase::Serialize, samples)
            .await
            .unwrap();
        assert_eq!(stats[0].size_bytes, br#"{"x":1}"#.len());
    }

    #[tokio::test]
    async fn test_deserialize_without_persisted_bytes_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let samples: Arc<[Sample]> = vec![Sample::new(0, 1, json!({ "x": 1 }))].into();
        let codec = json_codec(samples.clone(), temp_dir.path()).await;

        let err = runner(1)
            .run(codec, Phase::Deserialize, samples)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "IOError");
    }

    #[tokio::test]
    async fn test_corrupted_payload_fails_verification() {
        let temp_dir = TempDir::new().unwrap();
        let samples: Arc<[Sample]> = vec![Sample::new(0, 1, json!({ "x": 1 }))].into();
        let codec = json_codec(samples.clone(), temp_dir.path()).await;

        // Valid JSON, different value.
        codec.persist(0, br#"{"x":2}"#).await.unwrap();

        let err = runner(1)
            .run(Arc::clone(&codec), Phase::Deserialize, samples.clone())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "DecodeError");

        let unverified = runner(1)
            .with_verification(false)
            .run(codec, Phase::Deserialize, samples)
            .await;
        assert!(unverified.is_ok());
    }

    #[tokio::test]
    async fn test_empty_sample_set() {
        let temp_dir = TempDir::new().unwrap();
        let samples: Arc<[Sample]> = Vec::new().into();
        let codec = json_codec(samples.clone(), temp_dir.path()).await;

        let stats = runner(1)
            .run(codec, Phase::Serialize, samples)
            .await
            .unwrap();
        assert!(stats.is_empty());
    }

    #[tokio::test]
    async fn test_stats_and_scratch_keyed_by_sample_index() {
        let temp_dir = TempDir::new().unwrap();
        let samples: Arc<[Sample]> = vec![Sample::new(5, 1, json!({ "x": 1 }))].into();
        let codec = json_codec(samples.clone(), temp_dir.path()).await;

        let serialized = runner(2)
            .run(Arc::clone(&codec), Phase::Serialize, samples.clone())
            .await
            .unwrap();
        assert_eq!(serialized[0].sample_index, 5);
        assert!(codec.scratch().sample_path(5).exists());
        assert!(!codec.scratch().sample_path(0).exists());

        let deserialized = runner(2)
            .run(codec, Phase::Deserialize, samples)
            .await
            .unwrap();
        assert_eq!(deserialized[0].sample_index, 5);
    }

    #[test]
    fn test_panic_message_extraction() {
        assert_eq!(panic_message(Box::new("static")), "static");
        assert_eq!(panic_message(Box::new(String::from("owned"))), "owned");
        assert_eq!(panic_message(Box::new(7u8)), "unknown panic");
    }
}
