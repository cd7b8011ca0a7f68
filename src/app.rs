//! Process-level wiring for the two probe binaries.
//!
//! Core components never log or exit on their own; they hand outcomes and
//! ticks back to these loops, which translate them into tracing events and
//! process lifecycle.

use crate::clock::SystemMonotonicClock;
use crate::config::{GeneratorConfig, VerifierConfig};
use crate::sequence::{CheckOutcome, SequenceComparator, SequenceGenerator};
use crate::telemetry::ProgressTicker;
use crate::throttle::Throttle;
use crate::transport::{PublishTransport, SubscribeTransport, TcpPublisher, TcpSubscriber};
use crate::wire;
use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{error, info, warn};

const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Installs SIGINT/SIGTERM handlers that trip the returned flag.
pub fn shutdown_flag() -> Result<Arc<AtomicBool>> {
    let flag = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGTERM, flag.clone())
        .context("registering SIGTERM handler")?;
    signal_hook::flag::register(signal_hook::consts::SIGINT, flag.clone())
        .context("registering SIGINT handler")?;
    Ok(flag)
}

/// Initializes the tracing sink; `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

/// Publish loop: generate, pace, publish, until the shutdown flag trips.
pub fn run_generator(config: GeneratorConfig, shutdown: Arc<AtomicBool>) -> Result<()> {
    config.validate()?;
    let mut clock = SystemMonotonicClock::new();
    let mut publisher =
        TcpPublisher::bind(&config.pub_endpoint, -1).context("binding publish endpoint")?;
    let mut generator = SequenceGenerator::new(config.vlen, config.update_interval, &mut clock);
    let mut throttle = Throttle::new(config.samp_rate, &mut clock);
    info!(
        endpoint = %config.pub_endpoint,
        vlen = config.vlen,
        samp_rate = config.samp_rate,
        "generator started"
    );

    while !shutdown.load(Ordering::Relaxed) {
        let batch = generator.next_batch(config.batch_slots, &mut clock);
        for tick in &batch.ticks {
            info!(index = tick.index, rate = tick.rate as u64, "progress");
        }
        for vector in &batch.vectors {
            publisher.publish(&wire::encode_record(vector))?;
        }
        let emitted = (batch.vectors.len() * config.vlen) as u64;
        sleep_until_due(throttle.pace(emitted, &mut clock), &shutdown);
    }

    info!(
        emitted = generator.counter(),
        hwm_drops = publisher.dropped_records(),
        "generator stopped"
    );
    publisher.close();
    Ok(())
}

/// Subscribe loop: receive, audit, check continuity, until shutdown or the
/// comparator halts. A halt is the drop circuit breaker doing its job, so it
/// still exits cleanly.
pub fn run_verifier(config: VerifierConfig, shutdown: Arc<AtomicBool>) -> Result<()> {
    config.validate()?;
    let mut clock = SystemMonotonicClock::new();
    let record_len = wire::record_len(config.vlen);
    let mut subscriber = TcpSubscriber::connect(&config.sub_endpoint, record_len, config.hwm)
        .context("starting subscriber")?;
    let mut comparator = SequenceComparator::new(config.max_err, &mut clock);
    let ticker = ProgressTicker::new(config.vlen, config.update_interval);
    info!(
        endpoint = %config.sub_endpoint,
        vlen = config.vlen,
        hwm = config.hwm,
        max_err = config.max_err,
        "verifier started"
    );

    while !shutdown.load(Ordering::Relaxed) {
        let Some(payload) = subscriber.subscribe()? else {
            continue;
        };
        let vector = match wire::decode_record(&payload, config.vlen) {
            Ok(vector) => vector,
            Err(err) => {
                error!(%err, "undecodable record");
                continue;
            }
        };

        if ticker.fires_at(comparator.received()) {
            info!(
                received = comparator.received(),
                expected = comparator.expected(),
                rate = comparator.rate(&mut clock) as u64,
                "progress"
            );
        }

        let report = vector.audit();
        if !report.is_clean() {
            error!(
                mismatched = report.mismatched,
                consistent = report.consistent,
                "data corruption"
            );
        }

        match comparator.check(vector.reference(), &mut clock) {
            CheckOutcome::Started { actual } => info!(actual, "sequence acquired"),
            CheckOutcome::Advanced => {}
            CheckOutcome::Reset { expected, actual } => {
                warn!(expected, actual, "reset");
            }
            CheckOutcome::Dropped {
                gap,
                expected,
                actual,
            } => {
                error!(gap, expected, actual, "dropped");
            }
            CheckOutcome::Halted { dropped_count } => {
                error!(dropped_count, "drop budget exhausted, stopping");
                break;
            }
        }
    }

    subscriber.close();
    info!(
        received = comparator.received(),
        expected = comparator.expected(),
        dropped = comparator.dropped_count(),
        "verifier stopped"
    );
    Ok(())
}

fn sleep_until_due(pause: Duration, shutdown: &AtomicBool) {
    let mut remaining = pause;
    while !remaining.is_zero() && !shutdown.load(Ordering::Relaxed) {
        let slice = remaining.min(SLEEP_SLICE);
        thread::sleep(slice);
        remaining = remaining.saturating_sub(slice);
    }
}
