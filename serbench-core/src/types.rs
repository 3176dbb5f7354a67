// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Newtype wrappers for validated inputs.
//!
//! Format identifiers and trial counts validate their invariants at creation
//! time, so the scheduler and runner never see an empty name or a zero trial count.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::HardValidationError;

/// Upper bound on measured trials per sample and phase.
pub const MAX_TRIALS: u64 = 1_000_000;

/// Trials per sample and phase when none are configured.
pub const DEFAULT_TRIALS: u64 = 1_000;

/// Validated codec format identifier (e.g. `JSON`, `MSGPACK`).
/// Must be non-empty, alphanumeric with hyphens/underscores, max 32 chars.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FormatId(String);

impl FormatId {
    /// Create a new FormatId with validation.
    pub fn new(id: impl Into<String>) -> Result<Self, HardValidationError> {
        let id = id.into();

        if id.is_empty() {
            return Err(HardValidationError::InvalidFieldValue {
                field: "format",
                value: id,
                reason: "Format identifier cannot be empty".to_string(),
            });
        }

        if id.len() > 32 {
            return Err(HardValidationError::InvalidFieldValue {
                field: "format",
                value: id.clone(),
                reason: format!("Format identifier too long: {} chars (max 32)", id.len()),
            });
        }

        if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(HardValidationError::InvalidFieldValue {
                field: "format",
                value: id,
                reason: "Format identifier must contain only ASCII alphanumerics, hyphens, and underscores".to_string(),
            });
        }

        Ok(Self(id))
    }

    /// Create without validation (for built-in, known-good names).
    pub fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FormatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for FormatId {
    type Error = HardValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FormatId> for String {
    fn from(id: FormatId) -> Self {
        id.0
    }
}

/// Validated number of measured trials per sample.
/// Must be in range 1..=MAX_TRIALS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct TrialCount(u64);

impl TrialCount {
    /// Create a new TrialCount with bounds validation.
    pub fn new(trials: u64) -> Result<Self, HardValidationError> {
        if !(1..=MAX_TRIALS).contains(&trials) {
            return Err(HardValidationError::InvalidFieldValue {
                field: "trials",
                value: trials.to_string(),
                reason: format!("Must be between 1 and {}", MAX_TRIALS),
            });
        }
        Ok(Self(trials))
    }

    /// Get the inner count.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl Default for TrialCount {
    fn default() -> Self {
        Self(DEFAULT_TRIALS)
    }
}

impl fmt::Display for TrialCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u64> for TrialCount {
    type Error = HardValidationError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TrialCount> for u64 {
    fn from(trials: TrialCount) -> Self {
        trials.0
    }
}

/// The two ordered phases every codec pipeline goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Serialize,
    Deserialize,
}

impl Phase {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Serialize => "serialize",
            Self::Deserialize => "deserialize",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
