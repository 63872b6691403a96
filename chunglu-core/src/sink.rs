//! Edge sink abstractions and retry handling.

use std::{num::NonZeroU32, thread, time::Duration};

use tracing::warn;

use crate::{edge::Edge, error::SinkError};

/// Append-only destination for generated edges.
///
/// # Examples
/// ```
/// use chunglu_core::{Edge, EdgeSink, MemorySink};
///
/// let mut sink = MemorySink::default();
/// sink.persist(Edge::new(1, 2))?;
/// sink.flush()?;
/// assert_eq!(sink.persisted(), 1);
/// assert_eq!(sink.edges(), &[Edge::new(1, 2)]);
/// # Ok::<(), chunglu_core::SinkError>(())
/// ```
pub trait EdgeSink {
    /// Returns a human-readable name used in diagnostics.
    fn name(&self) -> &str;

    /// Accepts one edge.
    ///
    /// # Errors
    /// Returns [`SinkError`] when the edge cannot be encoded or stored. An
    /// error means the edge was not accepted, so the call may be retried.
    fn persist(&mut self, edge: Edge) -> Result<(), SinkError>;

    /// Makes every accepted edge durable.
    ///
    /// # Errors
    /// Returns [`SinkError::Storage`] when buffered edges cannot be written.
    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }

    /// Returns the number of edges durably written so far.
    fn persisted(&self) -> u64;
}

impl<S: EdgeSink + ?Sized> EdgeSink for &mut S {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn persist(&mut self, edge: Edge) -> Result<(), SinkError> {
        (**self).persist(edge)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        (**self).flush()
    }

    fn persisted(&self) -> u64 {
        (**self).persisted()
    }
}

/// Sink that keeps every edge in memory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemorySink {
    edges: Vec<Edge>,
}

impl MemorySink {
    /// Returns the collected edges in arrival order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Consumes the sink and returns the collected edges.
    #[must_use]
    pub fn into_edges(self) -> Vec<Edge> {
        self.edges
    }
}

impl EdgeSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn persist(&mut self, edge: Edge) -> Result<(), SinkError> {
        self.edges.push(edge);
        Ok(())
    }

    fn persisted(&self) -> u64 {
        self.edges.len() as u64
    }
}

/// Bounded retry with exponential backoff for transient sink failures.
///
/// # Examples
/// ```
/// use std::{num::NonZeroU32, time::Duration};
/// use chunglu_core::RetryPolicy;
///
/// let policy = RetryPolicy::new(NonZeroU32::new(4).expect("non-zero"))
///     .with_initial_backoff(Duration::from_millis(10))
///     .with_max_backoff(Duration::from_millis(25));
/// assert_eq!(policy.backoff_for(1), Duration::from_millis(10));
/// assert_eq!(policy.backoff_for(2), Duration::from_millis(20));
/// assert_eq!(policy.backoff_for(3), Duration::from_millis(25));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: NonZeroU32,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl RetryPolicy {
    /// Default number of attempts per operation.
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
    /// Default delay before the first retry.
    pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_millis(50);
    /// Default ceiling on the delay between retries.
    pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(2);

    /// Allows up to `max_attempts` attempts per operation.
    #[must_use]
    pub const fn new(max_attempts: NonZeroU32) -> Self {
        Self {
            max_attempts,
            initial_backoff: Self::DEFAULT_INITIAL_BACKOFF,
            max_backoff: Self::DEFAULT_MAX_BACKOFF,
        }
    }

    /// Performs every operation exactly once.
    #[must_use]
    pub const fn no_retry() -> Self {
        Self::new(NonZeroU32::MIN)
    }

    /// Sets the delay before the first retry.
    #[must_use]
    pub const fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    /// Sets the ceiling on the delay between retries.
    #[must_use]
    pub const fn with_max_backoff(mut self, backoff: Duration) -> Self {
        self.max_backoff = backoff;
        self
    }

    /// Returns the maximum number of attempts per operation.
    #[must_use]
    pub const fn max_attempts(&self) -> NonZeroU32 {
        self.max_attempts
    }

    /// Returns the delay after failed attempt number `attempt` (1-based).
    #[must_use]
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let doublings = attempt.saturating_sub(1).min(31);
        self.initial_backoff
            .saturating_mul(1_u32 << doublings)
            .min(self.max_backoff)
    }

    /// Runs `operation` until it succeeds, fails permanently, or exhausts the
    /// attempt budget.
    ///
    /// # Errors
    /// Returns the first permanent error, or the last transient error once
    /// every attempt has been used.
    pub fn run<T, F>(&self, mut operation: F) -> Result<T, SinkError>
    where
        F: FnMut() -> Result<T, SinkError>,
    {
        let mut attempt = 1;
        loop {
            match operation() {
                Ok(value) => return Ok(value),
                Err(error) if error.is_transient() && attempt < self.max_attempts.get() => {
                    let delay = self.backoff_for(attempt);
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts.get(),
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "transient sink failure; retrying"
                    );
                    thread::sleep(delay);
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(NonZeroU32::new(Self::DEFAULT_MAX_ATTEMPTS).unwrap_or(NonZeroU32::MIN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::Cell;

    use rstest::rstest;

    fn fast_policy(attempts: u32) -> RetryPolicy {
        RetryPolicy::new(NonZeroU32::new(attempts).expect("non-zero attempts"))
            .with_initial_backoff(Duration::ZERO)
    }

    #[test]
    fn transient_failures_are_retried_until_success() {
        let calls = Cell::new(0);
        let result = fast_policy(3).run(|| {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(SinkError::transient("busy"))
            } else {
                Ok(calls.get())
            }
        });
        assert_eq!(result, Ok(3));
    }

    #[test]
    fn transient_failures_give_up_after_budget() {
        let calls = Cell::new(0);
        let result: Result<(), _> = fast_policy(2).run(|| {
            calls.set(calls.get() + 1);
            Err(SinkError::transient("busy"))
        });
        assert_eq!(result, Err(SinkError::transient("busy")));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn permanent_failures_are_not_retried() {
        let calls = Cell::new(0);
        let result: Result<(), _> = fast_policy(5).run(|| {
            calls.set(calls.get() + 1);
            Err(SinkError::permanent("read-only"))
        });
        assert_eq!(result, Err(SinkError::permanent("read-only")));
        assert_eq!(calls.get(), 1);
    }

    #[rstest]
    #[case(1, 50)]
    #[case(2, 100)]
    #[case(3, 200)]
    #[case(7, 2_000)]
    #[case(u32::MAX, 2_000)]
    fn default_backoff_doubles_up_to_the_ceiling(#[case] attempt: u32, #[case] millis: u64) {
        assert_eq!(
            RetryPolicy::default().backoff_for(attempt),
            Duration::from_millis(millis)
        );
    }

    #[test]
    fn memory_sink_counts_accepted_edges() {
        let mut sink = MemorySink::default();
        sink.persist(Edge::new(1, 2)).expect("memory sink accepts");
        sink.persist(Edge::new(1, 2)).expect("duplicates are valid");
        assert_eq!(sink.persisted(), 2);
        assert_eq!(sink.into_edges(), [Edge::new(1, 2), Edge::new(1, 2)]);
    }
}
