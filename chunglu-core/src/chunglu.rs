//! Run-level entry point tying the model, generator, and sink together.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::{
    Result,
    generator::GraphGenerator,
    model::DegreeClassModel,
    pipeline::{RunReport, run_pipeline},
    progress::ProgressObserver,
    sink::{EdgeSink, RetryPolicy},
};

/// A validated generation run.
///
/// # Examples
/// ```
/// use chunglu_core::{ChungLuBuilder, MemorySink};
///
/// let chunglu = ChungLuBuilder::new()
///     .with_classes([(40, 2.0), (10, 6.0)])
///     .with_seed(8989)
///     .build()?;
/// let mut sink = MemorySink::default();
/// let report = chunglu.run(&mut sink)?;
/// assert_eq!(report.persisted, sink.edges().len() as u64);
/// assert_eq!(report.stats.pairs_processed, 4);
/// # Ok::<(), chunglu_core::GeneratorError>(())
/// ```
#[derive(Clone, Debug)]
pub struct ChungLu {
    model: DegreeClassModel,
    seed: u64,
    channel_capacity: usize,
    retry: RetryPolicy,
}

impl ChungLu {
    pub(crate) const fn new(
        model: DegreeClassModel,
        seed: u64,
        channel_capacity: usize,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            model,
            seed,
            channel_capacity,
            retry,
        }
    }

    /// Returns the validated degree-class model.
    #[must_use]
    pub const fn model(&self) -> &DegreeClassModel {
        &self.model
    }

    /// Returns the seed of the random stream.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns the capacity of the edge channel.
    #[must_use]
    pub const fn channel_capacity(&self) -> usize {
        self.channel_capacity
    }

    /// Returns the retry policy applied to sink operations.
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Returns a generator over this run's model and seed.
    #[must_use]
    pub fn generator(&self) -> GraphGenerator<'_> {
        GraphGenerator::new(&self.model, self.seed)
    }

    /// Generates every edge and persists it through `sink`.
    ///
    /// # Errors
    /// Returns [`crate::GeneratorError::Sink`] when the sink fails with a
    /// permanent error or exhausts its retries, and
    /// [`crate::GeneratorError::GenerationFailed`] when the generation task
    /// terminates abnormally.
    pub fn run<S: EdgeSink>(&self, sink: S) -> Result<RunReport> {
        self.run_generator(self.generator(), sink)
    }

    /// Like [`ChungLu::run`], notifying `observer` after every class pair.
    ///
    /// # Errors
    /// Same as [`ChungLu::run`].
    pub fn run_with_observer<S: EdgeSink>(
        &self,
        sink: S,
        observer: Arc<dyn ProgressObserver>,
    ) -> Result<RunReport> {
        self.run_generator(self.generator().with_observer(observer), sink)
    }

    #[instrument(
        name = "core.run",
        err,
        skip(self, generator, sink),
        fields(
            sink = %sink.name(),
            classes = self.model.class_count(),
            vertices = self.model.vertex_count(),
            seed = self.seed,
        ),
    )]
    fn run_generator<S: EdgeSink>(
        &self,
        generator: GraphGenerator<'_>,
        mut sink: S,
    ) -> Result<RunReport> {
        info!(
            total_weight = self.model.total_weight(),
            expected_edges = self.model.expected_edge_count(),
            "starting edge generation"
        );
        run_pipeline(&generator, &mut sink, self.channel_capacity, &self.retry)
    }
}
