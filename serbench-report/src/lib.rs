// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Serbench Reporting
//!
//! Turns the scheduler's per-format results into a run report with host
//! metadata, renders the summary table, and persists reports as JSON.

pub mod report;
pub mod reporter;

pub use report::{BenchmarkReport, FormatReport, SystemInfo};
pub use reporter::{JsonReporter, ReporterError};
