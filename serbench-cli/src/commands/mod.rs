// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! CLI command modules.

use std::path::Path;

use anyhow::Context;
use serbench_core::{Config, ConfigLoader};

pub mod formats;
pub mod run;
pub mod validate;

/// Config file picked up from the working directory when `--config` is absent.
const DEFAULT_CONFIG: &str = "serbench.yaml";

/// Load the explicit config, else `./serbench.yaml`, else built-in defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(path) = path {
        return ConfigLoader::load_file(path)
            .with_context(|| format!("loading {}", path.display()));
    }

    let fallback = Path::new(DEFAULT_CONFIG);
    if fallback.exists() {
        tracing::debug!(path = DEFAULT_CONFIG, "Using configuration from working directory");
        return ConfigLoader::load_file(fallback)
            .with_context(|| format!("loading {}", DEFAULT_CONFIG));
    }

    tracing::debug!("No configuration file, using defaults");
    Ok(Config::default())
}
