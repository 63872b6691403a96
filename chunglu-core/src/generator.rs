//! Orchestration of the edge-skipping sampler over every class pair.

use std::sync::Arc;

use crossbeam_channel::{SendError, Sender};
use rand::{SeedableRng, rngs::SmallRng};
use tracing::{debug, info, instrument};

use crate::{
    edge::Edge,
    model::DegreeClassModel,
    progress::{PairCounter, ProgressObserver},
    sampler::{ClassPairPlan, EdgeSkippingSampler, RngUnitSource, UnitSource},
};

/// Totals gathered while generating.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct GenerationStats {
    /// Class pairs fully sampled.
    pub pairs_processed: u64,
    /// Edges handed to the output.
    pub edges_emitted: u64,
    /// Degenerate self-pairs dropped by the sampler.
    pub self_pairs_discarded: u64,
}

/// Generation stopped because the output rejected an edge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Interrupted<E> {
    /// Error returned by the output.
    pub error: E,
    /// Totals up to the interruption; the rejected edge is not counted.
    pub stats: GenerationStats,
}

/// Drives [`EdgeSkippingSampler`] over all Λ² ordered class pairs.
///
/// Pairs are visited in row-major order `(0,0), (0,1), …, (Λ-1,Λ-1)` from a
/// single random stream seeded once per run, so a fixed seed and model always
/// yield the same edge sequence.
///
/// # Examples
/// ```
/// use chunglu_core::{DegreeClassModel, GraphGenerator};
///
/// let model = DegreeClassModel::try_new(vec![30, 10], vec![2.0, 8.0])?;
/// let generator = GraphGenerator::new(&model, 8989);
/// let (first, stats) = generator.collect_edges();
/// let (second, _) = generator.collect_edges();
/// assert_eq!(first, second);
/// assert_eq!(stats.pairs_processed, 4);
/// assert!(first.iter().all(|edge| !edge.is_self_loop()));
/// # Ok::<(), chunglu_core::ConfigError>(())
/// ```
pub struct GraphGenerator<'m> {
    model: &'m DegreeClassModel,
    seed: u64,
    counter: PairCounter,
    observer: Option<Arc<dyn ProgressObserver>>,
}

impl<'m> GraphGenerator<'m> {
    /// Creates a generator over `model` seeded with `seed`.
    #[must_use]
    pub fn new(model: &'m DegreeClassModel, seed: u64) -> Self {
        let classes = model.class_count() as u64;
        Self {
            model,
            seed,
            counter: PairCounter::new(classes * classes),
            observer: None,
        }
    }

    /// Attaches an observer notified after every class pair.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Returns the model being sampled.
    #[must_use]
    pub const fn model(&self) -> &'m DegreeClassModel {
        self.model
    }

    /// Returns the seed of the random stream.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns a handle to the pairs-processed counter.
    ///
    /// The handle outlives individual runs; each call to
    /// [`GraphGenerator::generate`] restarts its count from zero.
    #[must_use]
    pub fn counter(&self) -> PairCounter {
        self.counter.clone()
    }

    /// Iterates the plans of every ordered class pair in visiting order.
    pub fn pair_plans(&self) -> impl Iterator<Item = ClassPairPlan> + '_ {
        let classes = self.model.class_count();
        (0..classes)
            .flat_map(move |i| (0..classes).map(move |j| (i, j)))
            .filter_map(|(i, j)| ClassPairPlan::for_pair(self.model, i, j))
    }

    /// Generates every edge from the seeded random stream, handing each one
    /// to `emit`.
    ///
    /// # Errors
    /// Returns [`Interrupted`] carrying the first error from `emit`; no
    /// further edges are generated after it.
    pub fn generate<E, F>(&self, emit: F) -> Result<GenerationStats, Interrupted<E>>
    where
        F: FnMut(Edge) -> Result<(), E>,
    {
        let units = RngUnitSource::new(SmallRng::seed_from_u64(self.seed));
        self.generate_with_units(units, emit)
    }

    /// Generates every edge using `units` as the source of uniform draws.
    ///
    /// # Errors
    /// Returns [`Interrupted`] carrying the first error from `emit`.
    #[instrument(
        name = "core.generate",
        skip_all,
        fields(classes = self.model.class_count(), seed = self.seed),
    )]
    pub fn generate_with_units<U, E, F>(
        &self,
        mut units: U,
        mut emit: F,
    ) -> Result<GenerationStats, Interrupted<E>>
    where
        U: UnitSource,
        F: FnMut(Edge) -> Result<(), E>,
    {
        self.counter.reset();
        let mut stats = GenerationStats::default();

        for plan in self.pair_plans() {
            let mut sampler = EdgeSkippingSampler::new(plan, &mut units);
            let mut delivered = 0_u64;
            let mut failure = None;
            for edge in sampler.by_ref() {
                if let Err(error) = emit(edge) {
                    failure = Some(error);
                    break;
                }
                delivered += 1;
            }
            stats.edges_emitted += delivered;
            stats.self_pairs_discarded += sampler.discarded();
            record_pair_metrics(delivered, sampler.discarded());
            if let Some(error) = failure {
                return Err(Interrupted { error, stats });
            }

            stats.pairs_processed += 1;
            let completed = self.counter.increment();
            debug!(
                source_class = plan.source_class(),
                target_class = plan.target_class(),
                probability = plan.probability(),
                candidates = plan.candidates(),
                edges = delivered,
                "class pair sampled"
            );
            if let Some(observer) = &self.observer {
                observer.pair_completed(completed, self.counter.total());
            }
        }

        info!(
            pairs = stats.pairs_processed,
            edges = stats.edges_emitted,
            self_pairs_discarded = stats.self_pairs_discarded,
            "edge generation complete"
        );
        if let Some(observer) = &self.observer {
            observer.finished(&stats);
        }
        Ok(stats)
    }

    /// Generates into `sender`, blocking whenever the channel is full.
    ///
    /// The caller drops `sender` afterwards to signal end of data.
    ///
    /// # Errors
    /// Returns [`Interrupted`] when every receiver has been dropped.
    pub fn send_to(
        &self,
        sender: &Sender<Edge>,
    ) -> Result<GenerationStats, Interrupted<SendError<Edge>>> {
        self.generate(|edge| sender.send(edge))
    }

    /// Generates every edge into memory.
    ///
    /// Intended for small models and tests; large models should stream
    /// through [`crate::ChungLu::run`].
    #[must_use]
    pub fn collect_edges(&self) -> (Vec<Edge>, GenerationStats) {
        let mut edges = Vec::new();
        let outcome = self.generate(|edge| {
            edges.push(edge);
            Ok::<(), std::convert::Infallible>(())
        });
        let stats = match outcome {
            Ok(stats) => stats,
            Err(Interrupted { error, .. }) => match error {},
        };
        (edges, stats)
    }
}

#[cfg(feature = "metrics")]
fn record_pair_metrics(edges: u64, discarded: u64) {
    metrics::counter!("chunglu_edges_emitted").increment(edges);
    metrics::counter!("chunglu_self_pairs_discarded").increment(discarded);
    metrics::counter!("chunglu_class_pairs_processed").increment(1);
}

#[cfg(not(feature = "metrics"))]
fn record_pair_metrics(_edges: u64, _discarded: u64) {}
