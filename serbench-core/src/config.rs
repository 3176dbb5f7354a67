// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! YAML configuration parser with strict schema validation.
//!
//! Validates the benchmark configuration before any pipeline starts.
//! Any invalid field results in a HardValidationError that aborts the run.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::codec::{CodecRegistry, Format};
use crate::error::{BenchError, BenchResult, HardValidationError};
use crate::runner::BenchmarkRunner;
use crate::samples::{StructSchema, KNOWN_STRUCTS};
use crate::types::{FormatId, TrialCount, DEFAULT_TRIALS};

/// Upper bound on untimed warmup iterations.
const MAX_WARMUP_TRIALS: u64 = 100_000;

/// Raw benchmark section as parsed from YAML (before validation).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBenchmarkConfig {
    #[serde(default = "default_trials")]
    trials: u64,
    #[serde(default)]
    warmup_trials: u64,
    #[serde(default = "default_scratch_dir")]
    scratch_dir: String,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default = "default_verify")]
    verify_round_trip: bool,
}

fn default_trials() -> u64 {
    DEFAULT_TRIALS
}

fn default_scratch_dir() -> String {
    "test_data".to_string()
}

fn default_verify() -> bool {
    true
}

impl Default for RawBenchmarkConfig {
    fn default() -> Self {
        Self {
            trials: default_trials(),
            warmup_trials: 0,
            scratch_dir: default_scratch_dir(),
            seed: None,
            verify_round_trip: default_verify(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSampleSpec {
    struct_id: u32,
}

fn default_formats() -> Vec<String> {
    Format::ALL.iter().map(|f| f.name().to_string()).collect()
}

fn default_samples() -> Vec<RawSampleSpec> {
    KNOWN_STRUCTS
        .iter()
        .map(|&struct_id| RawSampleSpec { struct_id })
        .collect()
}

/// Raw root configuration file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    benchmark: RawBenchmarkConfig,
    #[serde(default = "default_formats")]
    formats: Vec<String>,
    #[serde(default = "default_samples")]
    samples: Vec<RawSampleSpec>,
}

/// Validated benchmark settings.
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkConfig {
    pub trials: TrialCount,
    pub warmup_trials: u64,
    pub scratch_dir: PathBuf,
    /// Fixed seed for reproducible samples; random when `None`.
    pub seed: Option<u64>,
    pub verify_round_trip: bool,
}

/// One sample to generate, identified by its structural schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SampleSpec {
    pub struct_id: u32,
}

/// Complete validated configuration.
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    pub benchmark: BenchmarkConfig,
    /// Ordered, canonical format identifiers.
    pub formats: Vec<FormatId>,
    pub samples: Vec<SampleSpec>,
}

impl Config {
    pub fn struct_ids(&self) -> Vec<u32> {
        self.samples.iter().map(|s| s.struct_id).collect()
    }

    /// Runner configured with this benchmark's trial settings.
    pub fn runner(&self) -> BenchmarkRunner {
        BenchmarkRunner::new(self.benchmark.trials)
            .with_warmup(self.benchmark.warmup_trials)
            .with_verification(self.benchmark.verify_round_trip)
    }

    pub fn set_trials(&mut self, trials: u64) -> BenchResult<()> {
        self.benchmark.trials = TrialCount::new(trials)?;
        Ok(())
    }

    /// Replace the format list, validated against `registry`.
    pub fn set_formats(&mut self, names: &[String], registry: &CodecRegistry) -> BenchResult<()> {
        self.formats = ConfigLoader::validate_formats(names, registry)?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            benchmark: BenchmarkConfig {
                trials: TrialCount::default(),
                warmup_trials: 0,
                scratch_dir: PathBuf::from(default_scratch_dir()),
                seed: None,
                verify_round_trip: true,
            },
            formats: Format::ALL.iter().map(Format::id).collect(),
            samples: KNOWN_STRUCTS
                .iter()
                .map(|&struct_id| SampleSpec { struct_id })
                .collect(),
        }
    }
}

/// Configuration loader with strict validation.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration from a YAML file.
    pub fn load_file(path: impl AsRef<Path>) -> BenchResult<Config> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(BenchError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| BenchError::Io {
            context: "reading config file",
            source: e,
        })?;

        Self::load_string(&content)
    }

    /// Load and validate configuration from a YAML string against the
    /// built-in formats.
    pub fn load_string(content: &str) -> BenchResult<Config> {
        Self::load_string_with(content, &CodecRegistry::builtin())
    }

    /// Load and validate configuration, resolving formats through `registry`.
    pub fn load_string_with(content: &str, registry: &CodecRegistry) -> BenchResult<Config> {
        let raw: RawConfig =
            serde_yaml::from_str(content).map_err(|e| BenchError::ConfigParse {
                message: format!("YAML parse error: {}", e),
            })?;

        Self::validate(raw, registry)
    }

    fn validate(raw: RawConfig, registry: &CodecRegistry) -> BenchResult<Config> {
        let benchmark = Self::validate_benchmark(raw.benchmark)?;
        let formats = Self::validate_formats(&raw.formats, registry)?;

        if raw.samples.is_empty() {
            return Err(HardValidationError::SchemaValidation {
                message: "At least one sample must be defined".to_string(),
            }
            .into());
        }

        let samples = raw
            .samples
            .into_iter()
            .map(|spec| {
                StructSchema::builtin(spec.struct_id)
                    .map(|_| SampleSpec {
                        struct_id: spec.struct_id,
                    })
                    .ok_or(HardValidationError::UnknownStruct {
                        struct_id: spec.struct_id,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Config {
            benchmark,
            formats,
            samples,
        })
    }

    fn validate_benchmark(raw: RawBenchmarkConfig) -> BenchResult<BenchmarkConfig> {
        let trials = TrialCount::new(raw.trials)?;

        if raw.warmup_trials > MAX_WARMUP_TRIALS {
            return Err(HardValidationError::InvalidFieldValue {
                field: "warmup_trials",
                value: raw.warmup_trials.to_string(),
                reason: format!("Must not exceed {}", MAX_WARMUP_TRIALS),
            }
            .into());
        }

        if raw.scratch_dir.trim().is_empty() {
            return Err(HardValidationError::MissingRequiredField {
                field: "scratch_dir",
                context: "benchmark section".to_string(),
            }
            .into());
        }

        Ok(BenchmarkConfig {
            trials,
            warmup_trials: raw.warmup_trials,
            scratch_dir: PathBuf::from(raw.scratch_dir),
            seed: raw.seed,
            verify_round_trip: raw.verify_round_trip,
        })
    }

    /// Resolve format names to canonical identifiers, preserving order.
    fn validate_formats(names: &[String], registry: &CodecRegistry) -> BenchResult<Vec<FormatId>> {
        if names.is_empty() {
            return Err(HardValidationError::SchemaValidation {
                message: "At least one format must be defined".to_string(),
            }
            .into());
        }

        let mut seen = HashSet::new();
        let mut formats = Vec::with_capacity(names.len());
        for name in names {
            let format = registry
                .resolve(name.trim())
                .cloned()
                .ok_or_else(|| BenchError::UnknownFormat(name.clone()))?;

            if !seen.insert(format.clone()) {
                return Err(HardValidationError::DuplicateFormat {
                    id: format.to_string(),
                }
                .into());
            }
            formats.push(format);
        }

        Ok(formats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_CONFIG: &str = r#"
benchmark:
  trials: 50
  warmup_trials: 5
  scratch_dir: /tmp/serbench
  seed: 42
  verify_round_trip: false

formats: [json, XML, MsgPack]

samples:
  - struct_id: 1
  - struct_id: 3
"#;

    #[test]
    fn test_valid_config() {
        let config = ConfigLoader::load_string(VALID_CONFIG).unwrap();

        assert_eq!(config.benchmark.trials.value(), 50);
        assert_eq!(config.benchmark.warmup_trials, 5);
        assert_eq!(config.benchmark.scratch_dir, PathBuf::from("/tmp/serbench"));
        assert_eq!(config.benchmark.seed, Some(42));
        assert!(!config.benchmark.verify_round_trip);

        let formats: Vec<_> = config.formats.iter().map(|f| f.as_str()).collect();
        assert_eq!(formats, vec!["JSON", "XML", "MSGPACK"]);
        assert_eq!(config.struct_ids(), vec![1, 3]);
    }

    #[test]
    fn test_defaults_match_default_config() {
        let loaded = ConfigLoader::load_string("{}").unwrap();
        let default = Config::default();

        assert_eq!(loaded.benchmark.trials, default.benchmark.trials);
        assert_eq!(loaded.benchmark.scratch_dir, default.benchmark.scratch_dir);
        assert!(loaded.benchmark.verify_round_trip);
        assert_eq!(loaded.formats, default.formats);
        assert_eq!(loaded.samples, default.samples);
        assert_eq!(default.formats.len(), 5);
    }

    #[test]
    fn test_zero_trials_rejected() {
        let result = ConfigLoader::load_string("benchmark:\n  trials: 0\n");
        assert!(matches!(result, Err(BenchError::HardValidation(_))));
    }

    #[test]
    fn test_unknown_format_rejected() {
        let result = ConfigLoader::load_string("formats: [JSON, AVRO]\n");
        assert!(matches!(result, Err(BenchError::UnknownFormat(name)) if name == "AVRO"));
    }

    #[test]
    fn test_duplicate_format_rejected() {
        let result = ConfigLoader::load_string("formats: [JSON, json]\n");
        assert!(matches!(
            result,
            Err(BenchError::HardValidation(
                HardValidationError::DuplicateFormat { .. }
            ))
        ));
    }

    #[test]
    fn test_empty_sets_rejected() {
        assert!(ConfigLoader::load_string("formats: []\n").is_err());
        assert!(ConfigLoader::load_string("samples: []\n").is_err());
    }

    #[test]
    fn test_unknown_struct_rejected() {
        let result = ConfigLoader::load_string("samples:\n  - struct_id: 9\n");
        assert!(matches!(
            result,
            Err(BenchError::HardValidation(
                HardValidationError::UnknownStruct { struct_id: 9 }
            ))
        ));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = ConfigLoader::load_string("benchmark:\n  trails: 10\n");
        assert!(matches!(result, Err(BenchError::ConfigParse { .. })));
    }

    #[test]
    fn test_missing_file() {
        let result = ConfigLoader::load_file("/nonexistent/serbench.yaml");
        assert!(matches!(result, Err(BenchError::ConfigNotFound { .. })));
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        config.set_trials(7).unwrap();
        assert!(config.set_trials(0).is_err());

        config
            .set_formats(&["yaml".to_string()], &CodecRegistry::builtin())
            .unwrap();
        assert_eq!(config.formats, vec![Format::Yaml.id()]);
        assert_eq!(config.runner().trials().value(), 7);
    }
}
