// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Trial harness for timing fallible codec operations.
//!
//! Runs untimed warmup iterations, then measured iterations, recording each
//! one's wall-clock duration. The first failing iteration aborts the loop.

use std::time::Instant;

/// A harness for measuring operation latency.
#[derive(Debug, Clone, Copy)]
pub struct TrialHarness {
    /// Number of warmup iterations before measurement
    warmup_iterations: u64,
    /// Number of measurement iterations
    measurement_iterations: u64,
}

impl TrialHarness {
    /// Create a new harness with default settings.
    pub fn new() -> Self {
        Self {
            warmup_iterations: 0,
            measurement_iterations: 100,
        }
    }

    /// Set the number of warmup iterations.
    pub fn warmup(mut self, iterations: u64) -> Self {
        self.warmup_iterations = iterations;
        self
    }

    /// Set the number of measurement iterations.
    pub fn iterations(mut self, iterations: u64) -> Self {
        self.measurement_iterations = iterations;
        self
    }

    pub fn measurement_iterations(&self) -> u64 {
        self.measurement_iterations
    }

    /// Run the operation and collect latency samples in nanoseconds.
    ///
    /// The closure performs a single iteration. Each output is dropped outside
    /// the timed region, and the output of the last measured iteration is
    /// returned with the samples. The first error, during warmup or
    /// measurement, is returned immediately.
    pub fn run<F, T, E>(&self, mut operation: F) -> Result<(Vec<u64>, Option<T>), E>
    where
        F: FnMut() -> Result<T, E>,
    {
        for _ in 0..self.warmup_iterations {
            operation()?;
        }

        let mut samples = Vec::with_capacity(self.measurement_iterations as usize);
        let mut last = None;
        for _ in 0..self.measurement_iterations {
            let start = Instant::now();
            let output = operation()?;
            samples.push(start.elapsed().as_nanos() as u64);
            last = Some(output);
        }

        Ok((samples, last))
    }
}

impl Default for TrialHarness {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_harness_basic() {
        let harness = TrialHarness::new().warmup(2).iterations(5);
        let mut calls = 0;

        let (samples, _) = harness
            .run(|| {
                calls += 1;
                thread::sleep(Duration::from_micros(100));
                Ok::<(), ()>(())
            })
            .unwrap();

        assert_eq!(samples.len(), 5);
        assert_eq!(calls, 7);
        for sample in &samples {
            assert!(*sample >= 100_000, "Sample {} < 100μs", sample);
        }
    }

    #[test]
    fn test_first_error_aborts() {
        let harness = TrialHarness::new().iterations(10);
        let mut calls = 0;

        let result = harness.run(|| {
            calls += 1;
            if calls == 3 {
                Err("third call")
            } else {
                Ok(())
            }
        });

        assert_eq!(result, Err("third call"));
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_last_output_returned() {
        let harness = TrialHarness::new().warmup(1).iterations(3);
        let mut calls = 0;

        let (samples, last) = harness
            .run(|| {
                calls += 1;
                Ok::<_, ()>(vec![0u8; calls])
            })
            .unwrap();

        assert_eq!(samples.len(), 3);
        assert_eq!(last, Some(vec![0u8; 4]));
    }

    #[test]
    fn test_warmup_error_aborts_before_measurement() {
        let harness = TrialHarness::new().warmup(1).iterations(10);
        let result = harness.run(|| Err::<(), _>("warmup"));
        assert_eq!(result, Err("warmup"));
    }
}
