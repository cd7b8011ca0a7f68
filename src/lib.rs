//! Sequence-integrity probe for high-rate pub/sub streaming paths.
//!
//! Two binaries exercise a streaming data path end to end: `seq-gen`
//! publishes vectors whose elements broadcast a monotonically increasing
//! counter, and `seq-sink` subscribes, audits each vector's internal
//! consistency, and classifies every observed value as expected, reset, or
//! dropped while tracking throughput. Dropping more than a configured budget
//! stops the verifier — the whole point of the probe is to make transport
//! loss loud.

pub mod app;
pub mod clock;
pub mod config;
pub mod rate;
pub mod sequence;
pub mod telemetry;
pub mod throttle;
pub mod transport;
pub mod wire;

pub use clock::{MonotonicClock, SystemMonotonicClock};
pub use config::{
    ConfigError, GeneratorConfig, VerifierConfig, DEFAULT_BATCH_SLOTS, DEFAULT_ENDPOINT,
    DEFAULT_SAMP_RATE,
};
pub use rate::RateWindow;
pub use sequence::{
    CheckOutcome, CorruptionReport, GeneratorBatch, SeqVector, SequenceComparator,
    SequenceGenerator, TrackingPhase,
};
pub use telemetry::{ProgressTick, ProgressTicker, DEFAULT_UPDATE_INTERVAL};
pub use throttle::Throttle;
pub use transport::{
    effective_hwm, parse_endpoint, PublishTransport, RecordQueue, SubscribeTransport,
    TcpPublisher, TcpSubscriber, TransportError, DEFAULT_HIGH_WATER_MARK,
};
pub use wire::{decode_record, encode_record, record_len, WireError};
