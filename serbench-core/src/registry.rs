// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Thread-safe pipeline registry using DashMap.
//!
//! The scheduler owns all writes; progress reporters may read concurrently
//! through the shared handle.

use std::sync::Arc;

use dashmap::DashMap;

use crate::error::{BenchError, BenchResult};
use crate::state::{PipelineSnapshot, PipelineState, PipelineStateMachine};
use crate::types::FormatId;

/// Registry of per-format pipeline state machines.
#[derive(Debug)]
pub struct PipelineRegistry {
    pipelines: DashMap<FormatId, PipelineStateMachine>,
}

impl PipelineRegistry {
    pub fn new() -> Self {
        Self {
            pipelines: DashMap::new(),
        }
    }

    /// Create a registry wrapped in an Arc for sharing across tasks.
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a pipeline in `Init`.
    /// Fails if the format is already registered.
    pub fn register(&self, format: FormatId) -> BenchResult<()> {
        if self.pipelines.contains_key(&format) {
            return Err(BenchError::PipelineAlreadyExists(format));
        }
        self.pipelines
            .insert(format.clone(), PipelineStateMachine::new(format));
        Ok(())
    }

    pub fn get_state(&self, format: &FormatId) -> BenchResult<PipelineState> {
        self.pipelines
            .get(format)
            .map(|sm| sm.state())
            .ok_or_else(|| BenchError::PipelineNotFound(format.clone()))
    }

    pub fn transition(&self, format: &FormatId, target: PipelineState) -> BenchResult<()> {
        let mut sm = self
            .pipelines
            .get_mut(format)
            .ok_or_else(|| BenchError::PipelineNotFound(format.clone()))?;

        sm.transition_to(target)?;
        Ok(())
    }

    /// Walk a pipeline through several transitions in order.
    pub fn advance(&self, format: &FormatId, targets: &[PipelineState]) -> BenchResult<()> {
        for &target in targets {
            self.transition(format, target)?;
        }
        Ok(())
    }

    /// Mark a pipeline as failed. Returns false if it was already terminal.
    pub fn fail(&self, format: &FormatId) -> BenchResult<bool> {
        match self.transition(format, PipelineState::Failed) {
            Ok(()) => Ok(true),
            Err(BenchError::InvalidStateTransition(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub fn contains(&self, format: &FormatId) -> bool {
        self.pipelines.contains_key(format)
    }

    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }

    /// Formats whose pipeline is in `state`, sorted.
    pub fn formats_in_state(&self, state: PipelineState) -> Vec<FormatId> {
        let mut formats: Vec<_> = self
            .pipelines
            .iter()
            .filter(|r| r.state() == state)
            .map(|r| r.key().clone())
            .collect();
        formats.sort();
        formats
    }

    /// Formats that have not reached a terminal state, sorted.
    pub fn unfinished(&self) -> Vec<FormatId> {
        let mut formats: Vec<_> = self
            .pipelines
            .iter()
            .filter(|r| !r.state().is_terminal())
            .map(|r| r.key().clone())
            .collect();
        formats.sort();
        formats
    }

    /// Point-in-time view of every pipeline, sorted by format.
    pub fn snapshots(&self) -> Vec<PipelineSnapshot> {
        let mut snapshots: Vec<_> = self
            .pipelines
            .iter()
            .map(|r| PipelineSnapshot::from(r.value()))
            .collect();
        snapshots.sort_by(|a, b| a.format.cmp(&b.format));
        snapshots
    }
}

impl Default for PipelineRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> FormatId {
        FormatId::new(name).unwrap()
    }

    #[test]
    fn test_register_and_get() {
        let registry = PipelineRegistry::new();
        registry.register(id("JSON")).unwrap();

        assert!(registry.contains(&id("JSON")));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get_state(&id("JSON")).unwrap(), PipelineState::Init);
    }

    #[test]
    fn test_duplicate_registration() {
        let registry = PipelineRegistry::new();
        registry.register(id("JSON")).unwrap();
        assert!(matches!(
            registry.register(id("JSON")),
            Err(BenchError::PipelineAlreadyExists(_))
        ));
    }

    #[test]
    fn test_unknown_pipeline() {
        let registry = PipelineRegistry::new();
        assert!(matches!(
            registry.transition(&id("XML"), PipelineState::PendingSerialize),
            Err(BenchError::PipelineNotFound(_))
        ));
    }

    #[test]
    fn test_advance_and_query() {
        let registry = PipelineRegistry::new();
        registry.register(id("JSON")).unwrap();
        registry.register(id("YAML")).unwrap();

        registry
            .advance(
                &id("JSON"),
                &[
                    PipelineState::PendingSerialize,
                    PipelineState::RunningSerialize,
                ],
            )
            .unwrap();

        assert_eq!(
            registry.formats_in_state(PipelineState::RunningSerialize),
            vec![id("JSON")]
        );
        assert_eq!(registry.unfinished(), vec![id("JSON"), id("YAML")]);
    }

    #[test]
    fn test_fail_is_idempotent() {
        let registry = PipelineRegistry::new();
        registry.register(id("XML")).unwrap();

        assert!(registry.fail(&id("XML")).unwrap());
        assert!(!registry.fail(&id("XML")).unwrap());
        assert_eq!(registry.get_state(&id("XML")).unwrap(), PipelineState::Failed);
        assert!(registry.unfinished().is_empty());
    }

    #[test]
    fn test_snapshots_sorted() {
        let registry = PipelineRegistry::new();
        for name in ["YAML", "JSON", "XML"] {
            registry.register(id(name)).unwrap();
        }

        let formats: Vec<_> = registry
            .snapshots()
            .into_iter()
            .map(|s| s.format)
            .collect();
        assert_eq!(formats, vec!["JSON", "XML", "YAML"]);
    }

    #[test]
    fn test_concurrent_readers() {
        use std::thread;

        let registry = PipelineRegistry::new_shared();
        registry.register(id("JSON")).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let reg = Arc::clone(&registry);
                thread::spawn(move || reg.get_state(&id("JSON")).unwrap())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), PipelineState::Init);
        }
    }
}
