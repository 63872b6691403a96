//! Degree-class partition of the vertex set.
//!
//! A [`DegreeClassModel`] splits the global vertex identifier space
//! `[1, Σn]` into contiguous ranges, one per class, and precomputes the total
//! weighted degree `S` used to normalise every pairwise edge probability.

use crate::error::ConfigError;

/// Expected degrees of the reference degree table.
pub const REFERENCE_DEGREES: [f64; 11] =
    [1.0, 2.0, 3.0, 4.0, 5.0, 8.0, 9.0, 10.0, 100.0, 500.0, 1000.0];

/// Class sizes of the reference degree table, paired with
/// [`REFERENCE_DEGREES`] by index.
pub const REFERENCE_COUNTS: [u64; 11] = [8000, 7000, 6000, 5000, 4000, 3000, 2000, 1000, 10, 10, 5];

/// A read-only view of one degree class.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DegreeClass {
    index: usize,
    size: u64,
    degree: f64,
    base_label: u64,
}

impl DegreeClass {
    /// Returns the position of this class within the model.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Returns the number of vertices in the class.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Returns the expected degree shared by the class's vertices.
    #[must_use]
    pub const fn degree(&self) -> f64 {
        self.degree
    }

    /// Returns the first global vertex identifier of the class.
    #[must_use]
    pub const fn base_label(&self) -> u64 {
        self.base_label
    }

    /// Returns the last global vertex identifier of the class.
    #[must_use]
    pub const fn last_label(&self) -> u64 {
        self.base_label + self.size - 1
    }

    /// Returns whether `vertex` belongs to this class.
    #[must_use]
    pub const fn contains(&self, vertex: u64) -> bool {
        vertex >= self.base_label && vertex <= self.last_label()
    }
}

/// Partition of the vertex set into classes sharing an expected degree.
///
/// # Examples
/// ```
/// use chunglu_core::DegreeClassModel;
///
/// let model = DegreeClassModel::try_new(vec![4, 2], vec![2.0, 3.0])?;
/// assert_eq!(model.class_count(), 2);
/// assert_eq!(model.base_labels(), &[1, 5]);
/// assert_eq!(model.vertex_count(), 6);
/// assert_eq!(model.total_weight(), 14.0);
/// # Ok::<(), chunglu_core::ConfigError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct DegreeClassModel {
    sizes: Vec<u64>,
    degrees: Vec<f64>,
    base_labels: Vec<u64>,
    total_weight: f64,
    vertex_count: u64,
}

impl DegreeClassModel {
    /// Validates `sizes` and `degrees` and derives base labels and `S`.
    ///
    /// # Errors
    /// Returns [`ConfigError::LengthMismatch`] when the sequences differ in
    /// length, [`ConfigError::EmptyModel`] when both are empty,
    /// [`ConfigError::ZeroClassSize`] for an empty class,
    /// [`ConfigError::InvalidDegree`] for a non-finite or non-positive degree,
    /// and [`ConfigError::CapacityOverflow`] when vertex identifiers or
    /// candidate pair counts would not fit in a `u64`.
    pub fn try_new(sizes: Vec<u64>, degrees: Vec<f64>) -> Result<Self, ConfigError> {
        if sizes.len() != degrees.len() {
            return Err(ConfigError::LengthMismatch {
                sizes: sizes.len(),
                degrees: degrees.len(),
            });
        }
        if sizes.is_empty() {
            return Err(ConfigError::EmptyModel);
        }

        let mut base_labels = Vec::with_capacity(sizes.len());
        let mut next_label = 1_u64;
        let mut total_weight = 0.0_f64;
        let mut largest = 0_u64;
        for (class, (&size, &degree)) in sizes.iter().zip(&degrees).enumerate() {
            if size == 0 {
                return Err(ConfigError::ZeroClassSize { class });
            }
            if !degree.is_finite() || degree <= 0.0 {
                return Err(ConfigError::InvalidDegree { class, degree });
            }
            base_labels.push(next_label);
            next_label = next_label
                .checked_add(size)
                .ok_or(ConfigError::CapacityOverflow {
                    class,
                    quantity: "vertex identifier space",
                })?;
            total_weight += size as f64 * degree;
            if size > largest {
                largest = size;
                if largest.checked_mul(largest).is_none() {
                    return Err(ConfigError::CapacityOverflow {
                        class,
                        quantity: "candidate pair count",
                    });
                }
            }
        }

        Ok(Self {
            vertex_count: next_label - 1,
            sizes,
            degrees,
            base_labels,
            total_weight,
        })
    }

    /// Returns the number of classes, Λ.
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.sizes.len()
    }

    /// Returns the vertex count of class `class`.
    #[must_use]
    pub fn size(&self, class: usize) -> Option<u64> {
        self.sizes.get(class).copied()
    }

    /// Returns the expected degree of class `class`.
    #[must_use]
    pub fn degree(&self, class: usize) -> Option<f64> {
        self.degrees.get(class).copied()
    }

    /// Returns the first global vertex identifier of class `class`.
    #[must_use]
    pub fn base_label(&self, class: usize) -> Option<u64> {
        self.base_labels.get(class).copied()
    }

    /// Returns every base label in class order.
    #[must_use]
    pub fn base_labels(&self) -> &[u64] {
        &self.base_labels
    }

    /// Returns every class size in class order.
    #[must_use]
    pub fn sizes(&self) -> &[u64] {
        &self.sizes
    }

    /// Returns every expected degree in class order.
    #[must_use]
    pub fn degrees(&self) -> &[f64] {
        &self.degrees
    }

    /// Returns the total weighted degree `S = Σ n[i]·D[i]`.
    #[must_use]
    pub const fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Returns the total number of vertices, `Σ n[i]`.
    #[must_use]
    pub const fn vertex_count(&self) -> u64 {
        self.vertex_count
    }

    /// Returns a view of class `class`.
    #[must_use]
    pub fn class(&self, class: usize) -> Option<DegreeClass> {
        Some(DegreeClass {
            index: class,
            size: self.size(class)?,
            degree: self.degree(class)?,
            base_label: self.base_label(class)?,
        })
    }

    /// Iterates over every class in order.
    pub fn classes(&self) -> impl ExactSizeIterator<Item = DegreeClass> + '_ {
        self.sizes
            .iter()
            .zip(&self.degrees)
            .zip(&self.base_labels)
            .enumerate()
            .map(|(index, ((&size, &degree), &base_label))| DegreeClass {
                index,
                size,
                degree,
                base_label,
            })
    }

    /// Returns the class that owns global vertex `vertex`.
    ///
    /// # Examples
    /// ```
    /// use chunglu_core::DegreeClassModel;
    ///
    /// let model = DegreeClassModel::try_new(vec![3, 2], vec![1.0, 5.0])?;
    /// assert_eq!(model.class_of(3).map(|class| class.index()), Some(0));
    /// assert_eq!(model.class_of(4).map(|class| class.index()), Some(1));
    /// assert!(model.class_of(0).is_none());
    /// assert!(model.class_of(6).is_none());
    /// # Ok::<(), chunglu_core::ConfigError>(())
    /// ```
    #[must_use]
    pub fn class_of(&self, vertex: u64) -> Option<DegreeClass> {
        if vertex == 0 || vertex > self.vertex_count {
            return None;
        }
        let class = self.base_labels.partition_point(|&label| label <= vertex);
        self.class(class.checked_sub(1)?)
    }

    /// Returns the edge probability for the ordered class pair `(i, j)`.
    ///
    /// Off-diagonal pairs use `D[i]·D[j]/S`, diagonal pairs `D[i]²/S`. The
    /// result is clamped to `[0, 1]`.
    #[must_use]
    pub fn pair_probability(&self, i: usize, j: usize) -> Option<f64> {
        let p = if i == j {
            self.degree(i)?.powi(2) / self.total_weight
        } else {
            self.degree(i)? * self.degree(j)? / self.total_weight
        };
        Some(p.clamp(0.0, 1.0))
    }

    /// Returns the number of candidate local pairs for `(i, j)`.
    ///
    /// Off-diagonal pairs have `n[i]·n[j]` candidates, diagonal pairs
    /// `C(n[i], 2)`. Construction guarantees neither overflows.
    #[must_use]
    pub fn candidate_count(&self, i: usize, j: usize) -> Option<u64> {
        let rows = self.size(i)?;
        if i == j {
            Some(choose_two(rows))
        } else {
            Some(rows * self.size(j)?)
        }
    }

    /// Returns `Σ p(i,j)·end(i,j)` over all ordered class pairs.
    #[must_use]
    pub fn expected_edge_count(&self) -> f64 {
        let classes = self.class_count();
        (0..classes)
            .flat_map(|i| (0..classes).map(move |j| (i, j)))
            .filter_map(|(i, j)| {
                let p = self.pair_probability(i, j)?;
                let candidates = self.candidate_count(i, j)? as f64;
                Some(p * candidates)
            })
            .sum()
    }
}

/// Returns `C(n, 2) = n·(n-1)/2` without intermediate overflow for any
/// `n` whose square fits in a `u64`.
#[must_use]
pub(crate) const fn choose_two(n: u64) -> u64 {
    if n % 2 == 0 {
        (n / 2) * n.saturating_sub(1)
    } else {
        n * (n.saturating_sub(1) / 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;
    use rstest::rstest;

    use crate::test_utils::suite_proptest_config;

    #[test]
    fn reference_table_is_a_valid_model() {
        let model = DegreeClassModel::try_new(REFERENCE_COUNTS.to_vec(), REFERENCE_DEGREES.to_vec())
            .expect("reference table is valid");
        assert_eq!(model.vertex_count(), 36_025);
        assert_eq!(model.base_labels()[10], 36_021);
    }

    #[rstest]
    #[case(vec![1], vec![1.0], vec![1])]
    #[case(vec![4], vec![2.0], vec![1])]
    #[case(vec![3, 2, 5], vec![1.0, 2.0, 3.0], vec![1, 4, 6])]
    #[case(vec![8000, 7000, 6000], vec![1.0, 2.0, 3.0], vec![1, 8001, 15001])]
    fn computes_base_labels(
        #[case] sizes: Vec<u64>,
        #[case] degrees: Vec<f64>,
        #[case] expected: Vec<u64>,
    ) {
        let model = DegreeClassModel::try_new(sizes, degrees).expect("model must be valid");
        assert_eq!(model.base_labels(), expected.as_slice());
    }

    #[test]
    fn computes_total_weight() {
        let model = DegreeClassModel::try_new(vec![4], vec![2.0]).expect("model must be valid");
        assert_eq!(model.total_weight(), 8.0);
        assert_eq!(model.pair_probability(0, 0), Some(0.5));
        assert_eq!(model.candidate_count(0, 0), Some(6));
    }

    #[test]
    fn off_diagonal_pairs_use_degree_product() {
        let model =
            DegreeClassModel::try_new(vec![2, 3], vec![1.0, 4.0]).expect("model must be valid");
        // S = 2·1 + 3·4 = 14
        assert_eq!(model.pair_probability(0, 1), Some(4.0 / 14.0));
        assert_eq!(model.pair_probability(1, 0), Some(4.0 / 14.0));
        assert_eq!(model.pair_probability(1, 1), Some(1.0));
        assert_eq!(model.candidate_count(0, 1), Some(6));
        assert_eq!(model.candidate_count(1, 1), Some(3));
    }

    #[test]
    fn out_of_range_classes_yield_none() {
        let model = DegreeClassModel::try_new(vec![2], vec![1.0]).expect("model must be valid");
        assert!(model.class(1).is_none());
        assert!(model.pair_probability(0, 1).is_none());
        assert!(model.candidate_count(1, 0).is_none());
    }

    #[rstest]
    #[case(vec![1, 2], vec![1.0], ConfigError::LengthMismatch { sizes: 2, degrees: 1 })]
    #[case(vec![], vec![], ConfigError::EmptyModel)]
    #[case(vec![3, 0], vec![1.0, 2.0], ConfigError::ZeroClassSize { class: 1 })]
    #[case(vec![3], vec![0.0], ConfigError::InvalidDegree { class: 0, degree: 0.0 })]
    #[case(vec![3], vec![-2.0], ConfigError::InvalidDegree { class: 0, degree: -2.0 })]
    fn rejects_invalid_configurations(
        #[case] sizes: Vec<u64>,
        #[case] degrees: Vec<f64>,
        #[case] expected: ConfigError,
    ) {
        let err = DegreeClassModel::try_new(sizes, degrees).expect_err("config must fail");
        assert_eq!(err, expected);
    }

    #[test]
    fn rejects_non_finite_degrees() {
        let err = DegreeClassModel::try_new(vec![1], vec![f64::NAN]).expect_err("NaN must fail");
        assert!(matches!(err, ConfigError::InvalidDegree { class: 0, .. }));
    }

    #[rstest]
    #[case(vec![u64::MAX], "vertex identifier space")]
    #[case(vec![1 << 33], "candidate pair count")]
    #[case(vec![2, u64::MAX - 1], "vertex identifier space")]
    fn rejects_overflowing_sizes(#[case] sizes: Vec<u64>, #[case] quantity: &str) {
        let degrees = vec![1.0; sizes.len()];
        let err = DegreeClassModel::try_new(sizes, degrees).expect_err("overflow must fail");
        assert!(
            matches!(err, ConfigError::CapacityOverflow { quantity: q, .. } if q == quantity),
            "unexpected error: {err:?}"
        );
    }

    #[rstest]
    #[case(0, 0)]
    #[case(1, 0)]
    #[case(2, 1)]
    #[case(4, 6)]
    #[case(5, 10)]
    #[case(1 << 32, (1 << 31) * ((1 << 32) - 1))]
    fn choose_two_matches_closed_form(#[case] n: u64, #[case] expected: u64) {
        assert_eq!(choose_two(n), expected);
    }

    #[test]
    fn class_of_locates_owning_class() {
        let model =
            DegreeClassModel::try_new(vec![2, 1, 3], vec![1.0, 2.0, 3.0]).expect("valid model");
        let owners: Vec<_> = (1..=6)
            .map(|vertex| model.class_of(vertex).map(|class| class.index()))
            .collect();
        assert_eq!(owners, [Some(0), Some(0), Some(1), Some(2), Some(2), Some(2)]);
    }

    #[test]
    fn expected_edge_count_sums_every_pair() {
        let model = DegreeClassModel::try_new(vec![4], vec![2.0]).expect("valid model");
        assert_eq!(model.expected_edge_count(), 3.0);
    }

    fn model_strategy() -> impl Strategy<Value = (Vec<u64>, Vec<f64>)> {
        prop::collection::vec((1_u64..10_000, 0.5_f64..1_000.0), 1..32)
            .prop_map(|classes| classes.into_iter().unzip())
    }

    proptest! {
        #![proptest_config(suite_proptest_config(128))]

        #[test]
        fn base_labels_partition_vertex_space((sizes, degrees) in model_strategy()) {
            let total: u64 = sizes.iter().sum();
            let model = DegreeClassModel::try_new(sizes.clone(), degrees)
                .map_err(|err| TestCaseError::fail(err.to_string()))?;
            let labels = model.base_labels();
            prop_assert_eq!(labels.first().copied(), Some(1));
            for (window, size) in labels.windows(2).zip(&sizes) {
                prop_assert_eq!(window[1], window[0] + size);
            }
            let last = model.classes().last().map(|class| class.last_label());
            prop_assert_eq!(last, Some(total));
            prop_assert_eq!(model.vertex_count(), total);
            prop_assert!(model.total_weight() > 0.0);
        }
    }
}
