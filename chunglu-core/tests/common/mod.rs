use chunglu_core::{Edge, EdgeSink, SinkError};

/// Sink recording edges and flushes without ever failing.
#[derive(Default)]
pub struct RecordingSink {
    edges: Vec<Edge>,
    flushes: usize,
}

impl RecordingSink {
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[must_use]
    pub fn flushes(&self) -> usize {
        self.flushes
    }
}

impl EdgeSink for RecordingSink {
    fn name(&self) -> &str {
        "recording"
    }

    fn persist(&mut self, edge: Edge) -> Result<(), SinkError> {
        self.edges.push(edge);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.flushes += 1;
        Ok(())
    }

    fn persisted(&self) -> u64 {
        self.edges.len() as u64
    }
}

/// Sink rejecting every write with a permanent storage error.
pub struct RejectingSink;

impl EdgeSink for RejectingSink {
    fn name(&self) -> &str {
        "rejecting"
    }

    fn persist(&mut self, _edge: Edge) -> Result<(), SinkError> {
        Err(SinkError::permanent("disk full"))
    }

    fn persisted(&self) -> u64 {
        0
    }
}
