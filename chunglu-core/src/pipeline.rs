//! Concurrent hand-off between edge generation and persistence.
//!
//! A scoped generation thread sends edges into a bounded channel while the
//! calling thread drains them into the sink. Capacity `0` makes every send a
//! rendezvous with a receive; a positive capacity lets the generator run
//! ahead by that many edges before blocking. Dropping the sender is the
//! end-of-data signal and dropping the receiver stops the generator.

use std::{any::Any, sync::Arc, thread};

use crossbeam_channel::{Receiver, bounded};
use tracing::{error, info, instrument};

use crate::{
    Result,
    edge::Edge,
    error::{GeneratorError, SinkError},
    generator::{GenerationStats, GraphGenerator, Interrupted},
    sink::{EdgeSink, RetryPolicy},
};

/// Outcome of a completed run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RunReport {
    /// Edges durably written by the sink.
    pub persisted: u64,
    /// Totals gathered by the generator.
    pub stats: GenerationStats,
}

#[instrument(
    name = "core.pipeline",
    err,
    skip_all,
    fields(sink = %sink.name(), channel_capacity = capacity),
)]
pub(crate) fn run_pipeline<S: EdgeSink>(
    generator: &GraphGenerator<'_>,
    sink: &mut S,
    capacity: usize,
    retry: &RetryPolicy,
) -> Result<RunReport> {
    let (sender, receiver) = bounded::<Edge>(capacity);
    let counter = generator.counter();

    let (drained, generated) = thread::scope(|scope| {
        let producer = scope.spawn(move || generator.send_to(&sender));
        let drained = drain(receiver, sink, retry);
        (drained, producer.join())
    });

    let stats = match generated {
        Err(payload) => {
            let reason = panic_reason(payload.as_ref());
            error!(reason = %reason, "edge generation panicked");
            return Err(GeneratorError::GenerationFailed {
                pairs_processed: counter.processed(),
                reason,
            });
        }
        Ok(Ok(stats)) => Some(stats),
        Ok(Err(Interrupted { .. })) => None,
    };

    if let Err(error) = drained {
        let persisted = sink.persisted();
        error!(error = %error, persisted, "sink failed; aborting run");
        return Err(GeneratorError::Sink {
            sink: Arc::from(sink.name()),
            persisted,
            error,
        });
    }

    let Some(stats) = stats else {
        return Err(GeneratorError::GenerationFailed {
            pairs_processed: counter.processed(),
            reason: Arc::from("edge stream closed before generation finished"),
        });
    };

    let report = RunReport {
        persisted: sink.persisted(),
        stats,
    };
    info!(
        persisted = report.persisted,
        emitted = stats.edges_emitted,
        "edge stream drained"
    );
    Ok(report)
}

/// Persists every received edge, then flushes. Returning drops `receiver`,
/// which unblocks and stops the generator on failure.
fn drain<S: EdgeSink>(
    receiver: Receiver<Edge>,
    sink: &mut S,
    retry: &RetryPolicy,
) -> core::result::Result<(), SinkError> {
    for edge in receiver {
        retry.run(|| sink.persist(edge))?;
    }
    retry.run(|| sink.flush())
}

fn panic_reason(payload: &(dyn Any + Send)) -> Arc<str> {
    if let Some(message) = payload.downcast_ref::<&str>() {
        Arc::from(*message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        Arc::from(message.as_str())
    } else {
        Arc::from("generation thread panicked")
    }
}
