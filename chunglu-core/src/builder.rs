//! Builder utilities for configuring generation runs.
//!
//! Collects degree classes, the seed, and pipeline settings, and validates
//! them before constructing [`ChungLu`] instances.

use crate::{Result, chunglu::ChungLu, model::DegreeClassModel, sink::RetryPolicy};

/// Configures and constructs [`ChungLu`] instances.
///
/// # Examples
/// ```
/// use chunglu_core::ChungLuBuilder;
///
/// let chunglu = ChungLuBuilder::new()
///     .with_class_sizes(vec![8000, 10])
///     .with_degrees(vec![1.0, 500.0])
///     .with_seed(7)
///     .with_channel_capacity(0)
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(chunglu.model().class_count(), 2);
/// assert_eq!(chunglu.seed(), 7);
/// assert_eq!(chunglu.channel_capacity(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct ChungLuBuilder {
    sizes: Vec<u64>,
    degrees: Vec<f64>,
    seed: u64,
    channel_capacity: usize,
    retry: RetryPolicy,
}

impl ChungLuBuilder {
    /// Seed used when none is configured.
    pub const DEFAULT_SEED: u64 = 8989;
    /// Edge channel capacity used when none is configured.
    pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

    /// Creates a builder with no classes and default settings.
    ///
    /// # Examples
    /// ```
    /// use chunglu_core::ChungLuBuilder;
    ///
    /// let builder = ChungLuBuilder::new();
    /// assert_eq!(builder.seed(), ChungLuBuilder::DEFAULT_SEED);
    /// assert!(builder.class_sizes().is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the vertex count of every class.
    #[must_use]
    pub fn with_class_sizes(mut self, sizes: Vec<u64>) -> Self {
        self.sizes = sizes;
        self
    }

    /// Sets the expected degree of every class.
    #[must_use]
    pub fn with_degrees(mut self, degrees: Vec<f64>) -> Self {
        self.degrees = degrees;
        self
    }

    /// Sets sizes and degrees together from `(size, degree)` pairs.
    ///
    /// # Examples
    /// ```
    /// use chunglu_core::ChungLuBuilder;
    ///
    /// let builder = ChungLuBuilder::new().with_classes([(4, 2.0), (1, 9.0)]);
    /// assert_eq!(builder.class_sizes(), &[4, 1]);
    /// assert_eq!(builder.degrees(), &[2.0, 9.0]);
    /// ```
    #[must_use]
    pub fn with_classes(mut self, classes: impl IntoIterator<Item = (u64, f64)>) -> Self {
        (self.sizes, self.degrees) = classes.into_iter().unzip();
        self
    }

    /// Sets the seed of the random stream.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the edge channel capacity; `0` makes every hand-off a rendezvous.
    #[must_use]
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Sets the retry policy for transient sink failures.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Returns the configured class sizes.
    #[must_use]
    pub fn class_sizes(&self) -> &[u64] {
        &self.sizes
    }

    /// Returns the configured expected degrees.
    #[must_use]
    pub fn degrees(&self) -> &[f64] {
        &self.degrees
    }

    /// Returns the configured seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns the configured channel capacity.
    #[must_use]
    pub fn channel_capacity(&self) -> usize {
        self.channel_capacity
    }

    /// Validates the configuration and constructs a [`ChungLu`] instance.
    ///
    /// # Errors
    /// Returns [`crate::GeneratorError::InvalidConfig`] when the degree
    /// classes are rejected by [`DegreeClassModel::try_new`].
    pub fn build(self) -> Result<ChungLu> {
        let model = DegreeClassModel::try_new(self.sizes, self.degrees)?;
        Ok(ChungLu::new(
            model,
            self.seed,
            self.channel_capacity,
            self.retry,
        ))
    }
}

impl Default for ChungLuBuilder {
    fn default() -> Self {
        Self {
            sizes: Vec::new(),
            degrees: Vec::new(),
            seed: Self::DEFAULT_SEED,
            channel_capacity: Self::DEFAULT_CHANNEL_CAPACITY,
            retry: RetryPolicy::default(),
        }
    }
}
