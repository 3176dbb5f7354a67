// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `serbench run` command - Benchmark every configured format.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use serbench_core::{CodecAdapter, CodecRegistry, PipelineRegistry, SampleGenerator, Scheduler};
use serbench_report::{BenchmarkReport, JsonReporter};

/// How often pipeline progress is logged at debug level.
const PROGRESS_INTERVAL: Duration = Duration::from_millis(500);

pub struct RunArgs {
    pub trials: Option<u64>,
    pub formats: Option<Vec<String>>,
    pub scratch_dir: Option<PathBuf>,
    pub output: PathBuf,
    pub allow_failures: bool,
}

pub async fn execute(config_path: Option<&Path>, args: RunArgs) -> anyhow::Result<()> {
    let codecs = CodecRegistry::builtin();
    let mut config = super::load_config(config_path)?;

    if let Some(trials) = args.trials {
        config.set_trials(trials)?;
    }
    if let Some(formats) = &args.formats {
        config.set_formats(formats, &codecs)?;
    }
    if let Some(scratch_dir) = args.scratch_dir {
        config.benchmark.scratch_dir = scratch_dir;
    }

    let mut generator = match config.benchmark.seed {
        Some(seed) => SampleGenerator::new(seed),
        None => SampleGenerator::from_entropy(),
    };
    let samples = generator.generate_shared(&config.struct_ids())?;

    tracing::info!(
        formats = config.formats.len(),
        samples = samples.len(),
        trials = %config.benchmark.trials,
        scratch_dir = %config.benchmark.scratch_dir.display(),
        "Starting benchmark"
    );

    let adapters = config
        .formats
        .iter()
        .map(|format| {
            codecs.create(
                format.as_str(),
                Arc::clone(&samples),
                &config.benchmark.scratch_dir,
            )
        })
        .collect::<Result<Vec<Box<dyn CodecAdapter>>, _>>()?;

    let scheduler = Scheduler::new(config.runner());
    let progress = tokio::spawn(log_progress(scheduler.registry()));
    let results = scheduler.run(adapters, Arc::clone(&samples)).await;
    progress.abort();

    let report =
        BenchmarkReport::from_results(&results, config.benchmark.trials.value(), samples.len());

    println!();
    print!("{}", report.summary_table());
    println!();

    let reporter = JsonReporter::new(&args.output)
        .with_context(|| format!("creating report directory {}", args.output.display()))?;
    let path = reporter.save(&report)?;
    println!("Report written to {}", path.display());

    if report.has_failures() && !args.allow_failures {
        anyhow::bail!(
            "{} format(s) failed: {}",
            report.failed_formats().len(),
            report.failed_formats().join(", ")
        );
    }

    Ok(())
}

async fn log_progress(registry: Arc<PipelineRegistry>) {
    let mut ticker = tokio::time::interval(PROGRESS_INTERVAL);
    loop {
        ticker.tick().await;
        for snapshot in registry.snapshots() {
            tracing::debug!(
                format = %snapshot.format,
                state = %snapshot.current_state,
                time_in_state_ms = snapshot.time_in_state_ms,
                "Pipeline progress"
            );
        }
    }
}
