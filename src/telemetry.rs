/// Elements between progress log lines. At 8 Msps this is a tick every
/// ~1.25 s, matching the cadence the probe was tuned for.
pub const DEFAULT_UPDATE_INTERVAL: u64 = 10_000_000;

/// Boundary test for periodic progress telemetry.
///
/// A tick fires whenever a cumulative vector index lands on an
/// `update_interval`-aligned element count, i.e. `index * vlen` is a multiple
/// of the interval. Both sides of the probe key their progress lines off this
/// test: the generator against its emission counter, the verifier against its
/// received-vector count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressTicker {
    vlen: u64,
    update_interval: u64,
}

impl ProgressTicker {
    /// Creates a ticker for `vlen`-wide vectors.
    pub fn new(vlen: usize, update_interval: u64) -> Self {
        assert!(vlen > 0, "vector length must be > 0");
        assert!(update_interval > 0, "update interval must be > 0");
        Self {
            vlen: vlen as u64,
            update_interval,
        }
    }

    /// True when `index` vectors amount to an interval-aligned element count.
    pub fn fires_at(&self, index: u64) -> bool {
        index.saturating_mul(self.vlen) % self.update_interval == 0
    }
}

/// Periodic progress event, consumed only by the logging layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressTick {
    /// Cumulative vector index at the tick boundary.
    pub index: u64,
    /// Most recently computed throughput, items per second.
    pub rate: f64,
}
