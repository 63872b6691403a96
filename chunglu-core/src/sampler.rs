//! Geometric edge skipping over the candidate pairs of one class pair.
//!
//! Every ordered class pair `(i, j)` owns a virtual index space `[1, end]`
//! enumerating its candidate local vertex pairs. Instead of running one
//! Bernoulli(`p`) trial per index, the sampler draws the gap to the next
//! selected index from a geometric distribution, so its cost grows with the
//! number of edges produced rather than with `end`.

use rand::{Rng, distributions::Open01};
use tracing::debug;

use crate::{
    edge::Edge,
    model::{DegreeClassModel, choose_two},
};

/// Source of uniform draws from the open interval `(0, 1)`.
///
/// The sampler never touches ambient random state; callers pass a source
/// explicitly so runs are isolated and reproducible.
pub trait UnitSource {
    /// Returns the next draw in `(0, 1)`.
    fn next_unit(&mut self) -> f64;
}

impl<U: UnitSource + ?Sized> UnitSource for &mut U {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

/// Adapts any [`rand::Rng`] into a [`UnitSource`].
///
/// # Examples
/// ```
/// use chunglu_core::{RngUnitSource, UnitSource};
/// use rand::{SeedableRng, rngs::SmallRng};
///
/// let mut units = RngUnitSource::new(SmallRng::seed_from_u64(7));
/// let draw = units.next_unit();
/// assert!(draw > 0.0 && draw < 1.0);
/// ```
#[derive(Clone, Debug)]
pub struct RngUnitSource<R> {
    rng: R,
}

impl<R: Rng> RngUnitSource<R> {
    /// Wraps `rng`.
    #[must_use]
    pub const fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Returns the wrapped generator.
    #[must_use]
    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl<R: Rng> UnitSource for RngUnitSource<R> {
    fn next_unit(&mut self) -> f64 {
        self.rng.sample(Open01)
    }
}

/// How indices of a class pair's virtual space map to local coordinates.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PairLayout {
    /// Distinct classes: a row-major `rows × columns` grid.
    Inter {
        /// Vertex count of the target class.
        columns: u64,
    },
    /// One class paired with itself: the strict lower triangle `u > v`.
    Intra,
}

/// Everything the sampler needs to know about one ordered class pair.
///
/// # Examples
/// ```
/// use chunglu_core::{ClassPairPlan, DegreeClassModel};
///
/// let model = DegreeClassModel::try_new(vec![4], vec![2.0])?;
/// let plan = ClassPairPlan::for_pair(&model, 0, 0).expect("class 0 exists");
/// assert_eq!(plan.probability(), 0.5);
/// assert_eq!(plan.candidates(), 6);
/// assert_eq!(plan.decode(1), (1, 0));
/// assert_eq!(plan.decode(6), (3, 2));
/// # Ok::<(), chunglu_core::ConfigError>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClassPairPlan {
    source_class: usize,
    target_class: usize,
    source_base: u64,
    target_base: u64,
    probability: f64,
    candidates: u64,
    layout: PairLayout,
}

impl ClassPairPlan {
    /// Resolves the plan for the ordered class pair `(i, j)`.
    ///
    /// Returns `None` when either class is out of range.
    #[must_use]
    pub fn for_pair(model: &DegreeClassModel, i: usize, j: usize) -> Option<Self> {
        let layout = if i == j {
            PairLayout::Intra
        } else {
            PairLayout::Inter {
                columns: model.size(j)?,
            }
        };
        Some(Self {
            source_class: i,
            target_class: j,
            source_base: model.base_label(i)?,
            target_base: model.base_label(j)?,
            probability: model.pair_probability(i, j)?,
            candidates: model.candidate_count(i, j)?,
            layout,
        })
    }

    /// Returns the index of the source class.
    #[must_use]
    pub const fn source_class(&self) -> usize {
        self.source_class
    }

    /// Returns the index of the target class.
    #[must_use]
    pub const fn target_class(&self) -> usize {
        self.target_class
    }

    /// Returns the per-candidate edge probability.
    #[must_use]
    pub const fn probability(&self) -> f64 {
        self.probability
    }

    /// Returns `end`, the size of the virtual index space.
    #[must_use]
    pub const fn candidates(&self) -> u64 {
        self.candidates
    }

    /// Returns the index-to-pair mapping in use.
    #[must_use]
    pub const fn layout(&self) -> PairLayout {
        self.layout
    }

    /// Decodes the 1-based virtual `index` into local coordinates `(u, v)`.
    ///
    /// `index` must lie in `[1, candidates()]`.
    #[must_use]
    pub fn decode(&self, index: u64) -> (u64, u64) {
        debug_assert!(index >= 1 && index <= self.candidates);
        match self.layout {
            PairLayout::Inter { columns } => {
                let offset = index - 1;
                (offset / columns, offset % columns)
            }
            PairLayout::Intra => decode_lower_triangle(index),
        }
    }

    /// Decodes `index` and translates it into global vertex identifiers.
    #[must_use]
    pub fn global_pair(&self, index: u64) -> (u64, u64) {
        let (u, v) = self.decode(index);
        (self.source_base + u, self.target_base + v)
    }
}

/// Inverts the combinatorial number system for pairs: index `x` in
/// `[1, C(n, 2)]` maps to `(u, v)` with `u > v` and `x = C(u, 2) + v + 1`.
fn decode_lower_triangle(index: u64) -> (u64, u64) {
    let estimate = ((-1.0 + (1.0 + 8.0 * index as f64).sqrt()) / 2.0).ceil();
    // The float estimate drifts for large indices; settle `u` exactly on
    // C(u, 2) < index <= C(u + 1, 2).
    let mut row = (estimate as u64).max(1);
    while row > 1 && choose_two(row) >= index {
        row -= 1;
    }
    while choose_two(row + 1) < index {
        row += 1;
    }
    (row, index - choose_two(row) - 1)
}

/// Returns the number of unselected candidates to skip before the next
/// selected one, `floor(ln r / ln(1 - p))`.
///
/// `p >= 1` never skips and `p <= 0` skips the entire index space.
///
/// # Examples
/// ```
/// use chunglu_core::skip_length;
///
/// assert_eq!(skip_length(0.6, 0.5), 0);
/// assert_eq!(skip_length(0.2, 0.5), 2);
/// assert_eq!(skip_length(0.3, 1.0), 0);
/// assert_eq!(skip_length(0.3, 0.0), u64::MAX);
/// ```
#[must_use]
pub fn skip_length(draw: f64, probability: f64) -> u64 {
    if probability >= 1.0 {
        return 0;
    }
    if probability <= 0.0 {
        return u64::MAX;
    }
    let skip = (draw.ln() / (-probability).ln_1p()).floor();
    // Float-to-int `as` saturates, so gaps beyond u64::MAX end the pair.
    skip as u64
}

/// Lazily yields the edges selected for one class pair.
///
/// The iterator reproduces the outcome of independent Bernoulli trials over
/// `[1, end]` by advancing a cursor with geometric skips. Degenerate
/// self-pairs (`from == to`) are discarded without resetting the cursor and
/// counted in [`EdgeSkippingSampler::discarded`].
///
/// # Examples
/// ```
/// use chunglu_core::{ClassPairPlan, DegreeClassModel, EdgeSkippingSampler, RngUnitSource};
/// use rand::{SeedableRng, rngs::SmallRng};
///
/// let model = DegreeClassModel::try_new(vec![50, 20], vec![3.0, 6.0])?;
/// let plan = ClassPairPlan::for_pair(&model, 0, 1).expect("classes exist");
/// let mut units = RngUnitSource::new(SmallRng::seed_from_u64(42));
/// let edges: Vec<_> = EdgeSkippingSampler::new(plan, &mut units).collect();
/// assert!(edges.iter().all(|edge| edge.from() <= 50 && edge.to() > 50));
/// # Ok::<(), chunglu_core::ConfigError>(())
/// ```
#[derive(Debug)]
pub struct EdgeSkippingSampler<U> {
    plan: ClassPairPlan,
    units: U,
    cursor: u64,
    emitted: u64,
    discarded: u64,
}

impl<U: UnitSource> EdgeSkippingSampler<U> {
    /// Starts sampling `plan` at the first candidate index.
    #[must_use]
    pub const fn new(plan: ClassPairPlan, units: U) -> Self {
        Self {
            plan,
            units,
            cursor: 0,
            emitted: 0,
            discarded: 0,
        }
    }

    /// Returns the plan being sampled.
    #[must_use]
    pub const fn plan(&self) -> &ClassPairPlan {
        &self.plan
    }

    /// Returns the number of edges yielded so far.
    #[must_use]
    pub const fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Returns the number of self-pairs discarded so far.
    #[must_use]
    pub const fn discarded(&self) -> u64 {
        self.discarded
    }

    /// Returns whether the cursor has passed the end of the index space.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.cursor >= self.plan.candidates
    }
}

impl<U: UnitSource> Iterator for EdgeSkippingSampler<U> {
    type Item = Edge;

    fn next(&mut self) -> Option<Edge> {
        while self.cursor < self.plan.candidates {
            let skip = skip_length(self.units.next_unit(), self.plan.probability);
            self.cursor = self.cursor.saturating_add(skip).saturating_add(1);
            if self.cursor > self.plan.candidates {
                self.cursor = self.plan.candidates;
                return None;
            }
            let (from, to) = self.plan.global_pair(self.cursor);
            if from == to {
                self.discarded += 1;
                debug!(
                    source_class = self.plan.source_class,
                    target_class = self.plan.target_class,
                    index = self.cursor,
                    vertex = from,
                    "discarded self-pair"
                );
                continue;
            }
            self.emitted += 1;
            return Some(Edge::new(from, to));
        }
        None
    }
}
