// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Aggregated benchmark report.
//!
//! Collects the scheduler's per-format results together with run metadata
//! and host information, and renders the text summary table.

use std::collections::BTreeMap;
use std::fmt::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sysinfo::System;
use uuid::Uuid;

use serbench_core::{FormatId, LatencyMetrics, Phase, PhaseStats, PipelineResult};

/// System information captured at benchmark time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    pub os: String,
    pub os_version: String,
    /// Kernel version (Linux)
    pub kernel_version: Option<String>,
    pub cpu_model: String,
    pub cpu_cores: usize,
    /// Total system memory in bytes
    pub memory_bytes: u64,
    pub hostname: String,
}

impl SystemInfo {
    /// Collect current system information.
    pub fn collect() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu();
        sys.refresh_memory();

        Self {
            os: System::name().unwrap_or_else(|| "Unknown".to_string()),
            os_version: System::os_version().unwrap_or_else(|| "Unknown".to_string()),
            kernel_version: System::kernel_version(),
            cpu_model: sys
                .cpus()
                .first()
                .map(|cpu| cpu.brand().to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
            cpu_cores: sys.cpus().len(),
            memory_bytes: sys.total_memory(),
            hostname: System::host_name().unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

/// Outcome for one format as stored in the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FormatReport {
    Completed {
        serialize: PhaseStats,
        deserialize: PhaseStats,
    },
    Failed {
        phase: Phase,
        /// Error taxonomy name, e.g. `EncodeError`.
        kind: String,
        error: String,
    },
}

impl From<&PipelineResult> for FormatReport {
    fn from(result: &PipelineResult) -> Self {
        match result {
            PipelineResult::Completed {
                serialize,
                deserialize,
            } => Self::Completed {
                serialize: serialize.clone(),
                deserialize: deserialize.clone(),
            },
            PipelineResult::Failed(failure) => Self::Failed {
                phase: failure.phase,
                kind: failure.error.kind().to_string(),
                error: failure.error.to_string(),
            },
        }
    }
}

impl FormatReport {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Complete benchmark run report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    /// Suite identifier
    pub benchmark_suite: String,
    /// Framework version
    pub version: String,
    /// Unique id of this run
    pub run_id: Uuid,
    /// Timestamp when the run started
    pub timestamp: DateTime<Utc>,
    pub system_info: SystemInfo,
    /// Measured trials per sample and phase
    pub trials: u64,
    pub sample_count: usize,
    /// Results keyed by format name
    pub formats: BTreeMap<String, FormatReport>,
}

impl BenchmarkReport {
    /// Create an empty report for a run.
    pub fn new(trials: u64, sample_count: usize) -> Self {
        Self {
            benchmark_suite: "serbench".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            run_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            system_info: SystemInfo::collect(),
            trials,
            sample_count,
            formats: BTreeMap::new(),
        }
    }

    /// Build a report from the scheduler's final mapping.
    pub fn from_results(
        results: &BTreeMap<FormatId, PipelineResult>,
        trials: u64,
        sample_count: usize,
    ) -> Self {
        let mut report = Self::new(trials, sample_count);
        for (format, result) in results {
            report.add_format(format, result);
        }
        report
    }

    pub fn add_format(&mut self, format: &FormatId, result: &PipelineResult) {
        self.formats
            .insert(format.to_string(), FormatReport::from(result));
    }

    /// Names of the formats that failed, sorted.
    pub fn failed_formats(&self) -> Vec<&str> {
        self.formats
            .iter()
            .filter(|(_, report)| report.is_failed())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn has_failures(&self) -> bool {
        self.formats.values().any(FormatReport::is_failed)
    }

    /// Render a per-format, per-sample text table.
    pub fn summary_table(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:<10} {:>6} {:>12} {:>14} {:>14}",
            "FORMAT", "SAMPLE", "SIZE (B)", "SERIALIZE", "DESERIALIZE"
        );
        let _ = writeln!(out, "{}", "-".repeat(60));

        for (name, report) in &self.formats {
            match report {
                FormatReport::Completed {
                    serialize,
                    deserialize,
                } => {
                    for (ser, de) in serialize.iter().zip(deserialize) {
                        let _ = writeln!(
                            out,
                            "{:<10} {:>6} {:>12} {:>14} {:>14}",
                            name,
                            ser.sample_index,
                            ser.size_bytes,
                            LatencyMetrics::format_latency(ser.mean_duration_ns),
                            LatencyMetrics::format_latency(de.mean_duration_ns),
                        );
                    }
                }
                FormatReport::Failed { phase, kind, error } => {
                    let _ = writeln!(
                        out,
                        "{:<10} FAILED during {}: {} ({})",
                        name, phase, kind, error
                    );
                }
            }
        }

        out
    }
}
