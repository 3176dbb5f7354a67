// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Per-sample measurement statistics.
//!
//! A `SampleStat` is what one sample contributes to a completed phase: its
//! index, the exact encoded payload length, and the trial latency distribution.

use serde::{Deserialize, Serialize};

/// Latency metrics with statistical analysis, computed from raw trial
/// durations in nanoseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencyMetrics {
    pub min_ns: u64,
    pub max_ns: u64,
    /// Arithmetic mean latency in nanoseconds
    pub mean_ns: f64,
    /// Median (p50) latency in nanoseconds
    pub median_ns: u64,
    pub p95_ns: u64,
    pub p99_ns: u64,
    pub std_dev_ns: f64,
}

impl LatencyMetrics {
    /// Calculate metrics from a vector of latency samples (in nanoseconds).
    pub fn from_samples(mut samples: Vec<u64>) -> Self {
        if samples.is_empty() {
            return Self {
                min_ns: 0,
                max_ns: 0,
                mean_ns: 0.0,
                median_ns: 0,
                p95_ns: 0,
                p99_ns: 0,
                std_dev_ns: 0.0,
            };
        }

        samples.sort_unstable();
        let len = samples.len();

        let sum: u128 = samples.iter().map(|&x| x as u128).sum();
        let mean_ns = sum as f64 / len as f64;

        let variance: f64 = samples
            .iter()
            .map(|&x| {
                let diff = x as f64 - mean_ns;
                diff * diff
            })
            .sum::<f64>()
            / len as f64;

        Self {
            min_ns: samples[0],
            max_ns: samples[len - 1],
            mean_ns,
            median_ns: samples[len / 2],
            p95_ns: samples[((len as f64 * 0.95) as usize).min(len - 1)],
            p99_ns: samples[((len as f64 * 0.99) as usize).min(len - 1)],
            std_dev_ns: variance.sqrt(),
        }
    }

    /// Format latency in human-readable form (auto-selects ns/μs/ms).
    pub fn format_latency(ns: f64) -> String {
        if ns < 1_000.0 {
            format!("{:.0}ns", ns)
        } else if ns < 1_000_000.0 {
            format!("{:.2}μs", ns / 1_000.0)
        } else if ns < 1_000_000_000.0 {
            format!("{:.2}ms", ns / 1_000_000.0)
        } else {
            format!("{:.2}s", ns / 1_000_000_000.0)
        }
    }
}

/// Result of measuring one sample in one phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleStat {
    pub sample_index: usize,
    /// Exact byte length of the encoded payload.
    pub size_bytes: usize,
    pub mean_duration_ns: f64,
    pub latency: LatencyMetrics,
}

impl SampleStat {
    /// Build a stat from raw trial durations.
    pub fn from_trials(sample_index: usize, size_bytes: usize, trials_ns: Vec<u64>) -> Self {
        let latency = LatencyMetrics::from_samples(trials_ns);
        Self {
            sample_index,
            size_bytes,
            mean_duration_ns: latency.mean_ns,
            latency,
        }
    }
}

/// Stats for one completed phase, sorted by sample index.
pub type PhaseStats = Vec<SampleStat>;
