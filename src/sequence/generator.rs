use crate::clock::MonotonicClock;
use crate::rate::RateWindow;
use crate::sequence::vector::SeqVector;
use crate::telemetry::{ProgressTick, ProgressTicker};

/// Monotonic vector source.
///
/// Owns the process-wide counter: starts at 0, advances by exactly 1 per
/// emitted vector, and is never reset. Each batch request is satisfied in
/// full — the generator is a pure, non-blocking source with an infinite
/// input domain, so it never produces a partial batch.
#[derive(Debug, Clone)]
pub struct SequenceGenerator {
    vlen: usize,
    counter: u64,
    rate: f64,
    window: RateWindow,
    ticker: ProgressTicker,
}

/// One batch of generated vectors plus the telemetry ticks crossed while
/// producing it.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorBatch {
    pub vectors: Vec<SeqVector>,
    pub ticks: Vec<ProgressTick>,
}

impl SequenceGenerator {
    /// Creates a generator anchored at counter 0.
    pub fn new<C: MonotonicClock + ?Sized>(
        vlen: usize,
        update_interval: u64,
        clock: &mut C,
    ) -> Self {
        Self {
            vlen,
            counter: 0,
            rate: 0.0,
            window: RateWindow::open(0, clock),
            ticker: ProgressTicker::new(vlen, update_interval),
        }
    }

    /// Next value the generator will emit.
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Configured vector width.
    pub fn vlen(&self) -> usize {
        self.vlen
    }

    /// Cumulative-average emission rate, refreshed once per batch.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Fills `slots` output slots with broadcast vectors of the counter,
    /// advancing it by 1 per slot.
    ///
    /// Ticks carry the rate computed at the end of the *previous* batch; the
    /// rate is refreshed once per invocation, not per slot.
    pub fn next_batch<C: MonotonicClock + ?Sized>(
        &mut self,
        slots: usize,
        clock: &mut C,
    ) -> GeneratorBatch {
        let mut vectors = Vec::with_capacity(slots);
        let mut ticks = Vec::new();
        for _ in 0..slots {
            vectors.push(SeqVector::broadcast(self.counter, self.vlen));
            self.counter += 1;
            if self.ticker.fires_at(self.counter) {
                ticks.push(ProgressTick {
                    index: self.counter,
                    rate: self.rate,
                });
            }
        }
        self.rate = self.window.per_sec(self.counter, clock);
        GeneratorBatch { vectors, ticks }
    }
}
