use std::time::Instant;

/// Monotonic time source injected into every time-dependent component.
pub trait MonotonicClock {
    /// Returns the current monotonic timestamp in nanoseconds.
    fn now_ns(&mut self) -> u128;
}

/// System clock implementation backed by `Instant`.
#[derive(Debug, Clone)]
pub struct SystemMonotonicClock {
    start: Instant,
}

impl Default for SystemMonotonicClock {
    fn default() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl SystemMonotonicClock {
    /// Creates a clock anchored at the moment of construction.
    pub fn new() -> Self {
        Self::default()
    }
}

impl MonotonicClock for SystemMonotonicClock {
    fn now_ns(&mut self) -> u128 {
        self.start.elapsed().as_nanos()
    }
}
