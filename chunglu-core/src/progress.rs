//! Class-pair progress reporting.
//!
//! Generation walks Λ² class pairs. Observers are notified once per finished
//! pair and never influence control flow, so the core stays testable without
//! any display dependency.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use crate::generator::GenerationStats;

/// Receives a notification after every processed class pair.
///
/// # Examples
/// ```
/// use std::sync::atomic::{AtomicU64, Ordering};
/// use chunglu_core::ProgressObserver;
///
/// #[derive(Default)]
/// struct Latest(AtomicU64);
///
/// impl ProgressObserver for Latest {
///     fn pair_completed(&self, completed: u64, _total: u64) {
///         self.0.store(completed, Ordering::Relaxed);
///     }
/// }
///
/// let observer = Latest::default();
/// observer.pair_completed(3, 4);
/// assert_eq!(observer.0.load(Ordering::Relaxed), 3);
/// ```
pub trait ProgressObserver: Send + Sync {
    /// Called after `completed` of `total` class pairs have been sampled.
    fn pair_completed(&self, completed: u64, total: u64);

    /// Called once after the final class pair.
    fn finished(&self, _stats: &GenerationStats) {}
}

/// Shared count of processed class pairs.
///
/// Clones observe the same counter, so a reporter on another thread can poll
/// it while generation runs. The count only increases within one run; every
/// new run of the owning generator restarts it from zero.
#[derive(Clone, Debug)]
pub struct PairCounter {
    processed: Arc<AtomicU64>,
    total: u64,
}

impl PairCounter {
    /// Creates a counter for `total` class pairs.
    #[must_use]
    pub fn new(total: u64) -> Self {
        Self {
            processed: Arc::new(AtomicU64::new(0)),
            total,
        }
    }

    /// Returns the number of class pairs processed so far.
    #[must_use]
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Acquire)
    }

    /// Returns the total number of class pairs, Λ².
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Returns whether every class pair has been processed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.processed() >= self.total
    }

    pub(crate) fn increment(&self) -> u64 {
        self.processed.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub(crate) fn reset(&self) {
        self.processed.store(0, Ordering::Release);
    }
}
