use seqcheck::{MonotonicClock, RateWindow};

struct ManualClock {
    now_ns: u128,
}

impl ManualClock {
    fn new() -> Self {
        Self { now_ns: 0 }
    }

    fn advance_ms(&mut self, ms: u64) {
        self.now_ns += u128::from(ms) * 1_000_000;
    }
}

impl MonotonicClock for ManualClock {
    fn now_ns(&mut self) -> u128 {
        self.now_ns
    }
}

#[test]
fn zero_elapsed_yields_zero_rate() {
    let mut clock = ManualClock::new();
    let window = RateWindow::open(100, &mut clock);
    assert_eq!(window.per_sec(1_000, &mut clock), 0.0);
}

#[test]
fn rate_is_items_over_elapsed_since_anchor() {
    let mut clock = ManualClock::new();
    let window = RateWindow::open(100, &mut clock);
    clock.advance_ms(500);
    assert!((window.per_sec(600, &mut clock) - 1_000.0).abs() < 1e-6);
}

#[test]
fn reanchor_discards_prior_history() {
    let mut clock = ManualClock::new();
    let mut window = RateWindow::open(0, &mut clock);
    clock.advance_ms(10_000);
    window.reanchor(50, &mut clock);
    assert_eq!(window.base(), 50);
    assert_eq!(window.per_sec(50, &mut clock), 0.0);

    clock.advance_ms(1_000);
    assert!((window.per_sec(60, &mut clock) - 10.0).abs() < 1e-9);
}

#[test]
fn regressed_current_value_saturates_to_zero_items() {
    let mut clock = ManualClock::new();
    let window = RateWindow::open(100, &mut clock);
    clock.advance_ms(1_000);
    assert_eq!(window.per_sec(40, &mut clock), 0.0);
}
