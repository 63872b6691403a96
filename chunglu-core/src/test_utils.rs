//! Shared test utilities for `chunglu-core`.

use std::collections::VecDeque;

use chunglu_test_support::ci::property_test_profile::ProptestRunProfile;
use proptest::test_runner::Config as ProptestConfig;

use crate::{edge::Edge, error::SinkError, sampler::UnitSource, sink::EdgeSink};

/// Builds a proptest configuration honouring the shared case-count override.
#[must_use]
pub(crate) fn suite_proptest_config(default_cases: u32) -> ProptestConfig {
    let profile = ProptestRunProfile::load(default_cases);
    ProptestConfig {
        cases: profile.cases(),
        ..ProptestConfig::default()
    }
}

/// [`UnitSource`] replaying a fixed script of draws.
pub(crate) struct ScriptedUnits {
    draws: VecDeque<f64>,
    consumed: usize,
}

impl ScriptedUnits {
    pub(crate) fn new(draws: impl IntoIterator<Item = f64>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
            consumed: 0,
        }
    }

    /// Returns how many draws have been taken.
    pub(crate) fn consumed(&self) -> usize {
        self.consumed
    }
}

impl UnitSource for ScriptedUnits {
    fn next_unit(&mut self) -> f64 {
        self.consumed += 1;
        self.draws
            .pop_front()
            .unwrap_or_else(|| panic!("draw script exhausted after {} draws", self.consumed - 1))
    }
}

/// Sink that accepts `limit` edges and then fails permanently.
pub(crate) struct FailingSink {
    limit: u64,
    accepted: u64,
}

impl FailingSink {
    pub(crate) fn after(limit: u64) -> Self {
        Self { limit, accepted: 0 }
    }
}

impl EdgeSink for FailingSink {
    fn name(&self) -> &str {
        "failing"
    }

    fn persist(&mut self, _edge: Edge) -> Result<(), SinkError> {
        if self.accepted == self.limit {
            return Err(SinkError::permanent("store rejected write"));
        }
        self.accepted += 1;
        Ok(())
    }

    fn persisted(&self) -> u64 {
        self.accepted
    }
}

/// Sink whose every `period`-th call fails transiently.
pub(crate) struct FlakySink {
    period: u64,
    calls: u64,
    edges: Vec<Edge>,
}

impl FlakySink {
    pub(crate) fn failing_every(period: u64) -> Self {
        Self {
            period,
            calls: 0,
            edges: Vec::new(),
        }
    }

    pub(crate) fn edges(&self) -> &[Edge] {
        &self.edges
    }
}

impl EdgeSink for FlakySink {
    fn name(&self) -> &str {
        "flaky"
    }

    fn persist(&mut self, edge: Edge) -> Result<(), SinkError> {
        self.calls += 1;
        if self.calls % self.period == 0 {
            return Err(SinkError::transient("database is locked"));
        }
        self.edges.push(edge);
        Ok(())
    }

    fn persisted(&self) -> u64 {
        self.edges.len() as u64
    }
}
