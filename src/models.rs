//! Shared result types for transformation runs.

/// Outcome of one transformer invocation
#[derive(Debug, Default, Clone)]
pub struct TransformStats {
    /// Raw records read from the source
    pub rows_in: usize,
    /// Rows written across all outputs of this transformer
    pub rows_out: usize,
    /// Destination keys written, in write order
    pub outputs: Vec<String>,
    /// Set when the source yielded zero records (data-integrity anomaly,
    /// surfaced but not fatal)
    pub empty_input: bool,
    /// Wall-clock duration of the run
    pub elapsed_ms: u128,
}

impl TransformStats {
    /// Merge the outcome of another transformer into an aggregate.
    pub fn absorb(&mut self, other: TransformStats) {
        self.rows_in += other.rows_in;
        self.rows_out += other.rows_out;
        self.outputs.extend(other.outputs);
        self.empty_input |= other.empty_input;
        self.elapsed_ms += other.elapsed_ms;
    }
}
