//! Chung–Lu random graph generation by geometric edge skipping.
//!
//! Vertices are grouped into degree classes; every ordered class pair is
//! sampled with an edge-skipping iterator whose cost is proportional to the
//! number of edges produced. Generation streams into an [`EdgeSink`] through
//! a bounded channel.
//!
//! # Metrics
//!
//! When the `metrics` feature is enabled the generator emits:
//!
//! - `chunglu_edges_emitted` (counter)
//! - `chunglu_self_pairs_discarded` (counter)
//! - `chunglu_class_pairs_processed` (counter)
#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod chunglu;
mod edge;
mod error;
mod generator;
mod model;
mod pipeline;
mod progress;
mod sampler;
mod sink;

#[cfg(test)]
mod test_utils;

pub use crate::{
    builder::ChungLuBuilder,
    chunglu::ChungLu,
    edge::Edge,
    error::{
        ConfigError, ConfigErrorCode, GeneratorError, GeneratorErrorCode, Result, SinkError,
        SinkErrorCode,
    },
    generator::{GenerationStats, GraphGenerator, Interrupted},
    model::{DegreeClass, DegreeClassModel, REFERENCE_COUNTS, REFERENCE_DEGREES},
    pipeline::RunReport,
    progress::{PairCounter, ProgressObserver},
    sampler::{
        ClassPairPlan, EdgeSkippingSampler, PairLayout, RngUnitSource, UnitSource, skip_length,
    },
    sink::{EdgeSink, MemorySink, RetryPolicy},
};
