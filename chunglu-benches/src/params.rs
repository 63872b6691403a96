//! Benchmark parameter types.

use std::fmt;

/// Parameters for a single class-pair sampling run.
#[derive(Clone, Copy, Debug)]
pub struct SamplerBenchParams {
    /// Vertices in the sampled class.
    pub class_size: u64,
    /// Expected degree shared by every vertex in the class.
    pub degree: f64,
}

impl fmt::Display for SamplerBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={},D={}", self.class_size, self.degree)
    }
}

/// Parameters for a whole-model generation run.
#[derive(Clone, Copy, Debug)]
pub struct PipelineBenchParams {
    /// Divisor applied to every class size of the reference table.
    pub scale_down: u64,
    /// Capacity of the edge channel.
    pub channel_capacity: usize,
}

impl fmt::Display for PipelineBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "1/{},cap={}", self.scale_down, self.channel_capacity)
    }
}
