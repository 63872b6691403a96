//! Degree-class models used as benchmark inputs.

use chunglu_core::{ConfigError, DegreeClassModel, REFERENCE_COUNTS, REFERENCE_DEGREES};
use rand::{Rng, SeedableRng, rngs::SmallRng};

/// Returns the reference table with every class size divided by
/// `scale_down`, keeping at least one vertex per class.
///
/// # Errors
/// Returns [`ConfigError`] when the scaled table is rejected.
///
/// # Examples
/// ```
/// use chunglu_benches::presets::reference_model;
///
/// let model = reference_model(10)?;
/// assert_eq!(model.sizes()[0], 800);
/// assert_eq!(model.sizes()[10], 1);
/// # Ok::<(), chunglu_core::ConfigError>(())
/// ```
pub fn reference_model(scale_down: u64) -> Result<DegreeClassModel, ConfigError> {
    let divisor = scale_down.max(1);
    let sizes = REFERENCE_COUNTS
        .iter()
        .map(|count| (count / divisor).max(1))
        .collect();
    DegreeClassModel::try_new(sizes, REFERENCE_DEGREES.to_vec())
}

/// Returns a heavy-tailed model of `classes` classes: class `k` has degree
/// `2^k` and a size falling off as `degree^-exponent`, drawn around that
/// mean from a seeded stream.
///
/// # Errors
/// Returns [`ConfigError`] when `classes` is zero or the sizes overflow.
pub fn power_law_model(
    classes: u32,
    largest_class: u64,
    exponent: f64,
    seed: u64,
) -> Result<DegreeClassModel, ConfigError> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let (sizes, degrees) = (0..classes)
        .map(|k| {
            let degree = f64::from(k).exp2();
            let mean = largest_class as f64 * degree.powf(-exponent);
            let jitter: f64 = rng.gen_range(0.9..1.1);
            ((mean * jitter).round().max(1.0) as u64, degree)
        })
        .unzip();
    DegreeClassModel::try_new(sizes, degrees)
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case(1, 36_025)]
    #[case(1000, 8 + 7 + 6 + 5 + 4 + 3 + 2 + 1 + 1 + 1 + 1)]
    fn reference_model_scales_every_class(#[case] scale_down: u64, #[case] vertices: u64) {
        let model = reference_model(scale_down).expect("reference table is valid");
        assert_eq!(model.vertex_count(), vertices);
        assert_eq!(model.class_count(), REFERENCE_DEGREES.len());
    }

    #[test]
    fn power_law_sizes_shrink_with_degree() {
        let model = power_law_model(8, 100_000, 2.0, 7).expect("valid model");
        assert!(model.sizes().windows(2).all(|pair| pair[0] > pair[1]));
        assert_eq!(model.degrees()[3], 8.0);
    }

    #[test]
    fn power_law_rejects_empty_models() {
        assert_eq!(
            power_law_model(0, 10, 2.0, 1).map(|_| ()),
            Err(ConfigError::EmptyModel)
        );
    }
}
