//! Pub/sub transport collaborator.
//!
//! The probe treats the transport as an opaque reliable-order, lossy-delivery
//! byte pipe: it owns connection lifecycle, retry, and high-water-mark
//! policy, and exposes only `publish`/`subscribe` at a configured endpoint.

mod tcp;

pub use tcp::{RecordQueue, TcpPublisher, TcpSubscriber};

use std::net::{SocketAddr, ToSocketAddrs};
use thiserror::Error;

/// Queue capacity used when the configured high-water-mark is unset (≤ 0).
pub const DEFAULT_HIGH_WATER_MARK: usize = 1000;

/// Publishing half of the pub/sub contract.
pub trait PublishTransport {
    /// Queues one wire record for every connected subscriber. Never blocks:
    /// a subscriber whose high-water-mark is reached misses the record.
    fn publish(&mut self, record: &[u8]) -> Result<(), TransportError>;
}

/// Subscribing half of the pub/sub contract.
pub trait SubscribeTransport {
    /// Receives the next whole record, or `None` when the poll window passed
    /// with no data — callers check their shutdown flag in between.
    fn subscribe(&mut self) -> Result<Option<Vec<u8>>, TransportError>;
}

/// Resolves a `tcp://host:port` endpoint URI to a socket address.
pub fn parse_endpoint(endpoint: &str) -> Result<SocketAddr, TransportError> {
    let authority = endpoint
        .strip_prefix("tcp://")
        .ok_or_else(|| TransportError::Endpoint {
            endpoint: endpoint.to_string(),
            reason: "only tcp:// endpoints are supported".to_string(),
        })?;
    let mut addrs = authority
        .to_socket_addrs()
        .map_err(|err| TransportError::Endpoint {
            endpoint: endpoint.to_string(),
            reason: err.to_string(),
        })?;
    addrs.next().ok_or_else(|| TransportError::Endpoint {
        endpoint: endpoint.to_string(),
        reason: "host resolved to no addresses".to_string(),
    })
}

/// Translates a configured high-water-mark into a queue capacity.
pub fn effective_hwm(hwm: i64) -> usize {
    if hwm > 0 {
        hwm as usize
    } else {
        DEFAULT_HIGH_WATER_MARK
    }
}

/// Errors surfaced by the transport layer.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The endpoint URI could not be understood or resolved.
    #[error("invalid endpoint {endpoint}: {reason}")]
    Endpoint { endpoint: String, reason: String },
    /// Binding the publish socket failed.
    #[error("bind to {endpoint} failed: {source}")]
    Bind {
        endpoint: String,
        source: std::io::Error,
    },
    /// The transport was closed while the operation was in flight.
    #[error("transport closed")]
    Closed,
}
