//! Benchmark support crate for chunglu.
//!
//! Provides degree-class presets and parameter types used by the Criterion
//! benchmarks for the sampler and the generation pipeline.

pub mod params;
pub mod presets;
