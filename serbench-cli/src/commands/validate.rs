// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `serbench validate` command - Validate configuration file.

use std::path::Path;

use serbench_core::ConfigLoader;

pub fn execute(file: &Path) -> anyhow::Result<()> {
    tracing::info!(file = %file.display(), "Validating configuration");

    match ConfigLoader::load_file(file) {
        Ok(config) => {
            let benchmark = &config.benchmark;
            println!("✓ Configuration is valid");
            println!();
            println!("Benchmark Settings:");
            println!("  Trials:            {}", benchmark.trials);
            println!("  Warmup Trials:     {}", benchmark.warmup_trials);
            println!("  Scratch Directory: {}", benchmark.scratch_dir.display());
            println!(
                "  Seed:              {}",
                benchmark
                    .seed
                    .map(|seed| seed.to_string())
                    .unwrap_or_else(|| "random".to_string())
            );
            println!("  Verify Round Trip: {}", benchmark.verify_round_trip);
            println!();
            println!("Formats ({}):", config.formats.len());
            for format in &config.formats {
                println!("  - {}", format);
            }
            println!();
            println!("Samples ({}):", config.samples.len());
            for (index, sample) in config.samples.iter().enumerate() {
                println!("  - sample {} (struct {})", index, sample.struct_id);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed:");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}
