use crate::telemetry::DEFAULT_UPDATE_INTERVAL;
use crate::transport::{parse_endpoint, TransportError};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Endpoint both sides default to.
pub const DEFAULT_ENDPOINT: &str = "tcp://127.0.0.1:16199";

/// Default target rate, elements per second (pre-throttle).
pub const DEFAULT_SAMP_RATE: f64 = 8_000_000.0;

/// Output slots requested from the generator per scheduling pass.
pub const DEFAULT_BATCH_SLOTS: usize = 512;

/// Publisher-side settings (`seq-gen`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Publish endpoint URI.
    pub pub_endpoint: String,
    /// Samples per vector.
    pub vlen: usize,
    /// Target sample rate, elements per second.
    pub samp_rate: f64,
    /// Elements between progress log lines.
    pub update_interval: u64,
    /// Vectors produced per generator invocation.
    pub batch_slots: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            pub_endpoint: DEFAULT_ENDPOINT.to_string(),
            vlen: 1,
            samp_rate: DEFAULT_SAMP_RATE,
            update_interval: DEFAULT_UPDATE_INTERVAL,
            batch_slots: DEFAULT_BATCH_SLOTS,
        }
    }
}

impl GeneratorConfig {
    /// Loads settings from a JSON file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        load_json(path.as_ref())
    }

    /// Rejects settings the generator cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_vlen(self.vlen)?;
        if !(self.samp_rate.is_finite() && self.samp_rate > 0.0) {
            return Err(ConfigError::SampleRate(self.samp_rate));
        }
        if self.update_interval == 0 {
            return Err(ConfigError::UpdateInterval);
        }
        if self.batch_slots == 0 {
            return Err(ConfigError::BatchSlots);
        }
        parse_endpoint(&self.pub_endpoint)?;
        Ok(())
    }
}

/// Subscriber-side settings (`seq-sink`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VerifierConfig {
    /// Subscribe endpoint URI.
    pub sub_endpoint: String,
    /// Samples per vector.
    pub vlen: usize,
    /// Transport high-water-mark; non-positive means unset.
    pub hwm: i64,
    /// Elements between progress log lines.
    pub update_interval: u64,
    /// Drop events tolerated before the verifier stops.
    pub max_err: u64,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            sub_endpoint: DEFAULT_ENDPOINT.to_string(),
            vlen: 1,
            hwm: -1,
            update_interval: DEFAULT_UPDATE_INTERVAL,
            max_err: 10,
        }
    }
}

impl VerifierConfig {
    /// Loads settings from a JSON file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        load_json(path.as_ref())
    }

    /// Rejects settings the verifier cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_vlen(self.vlen)?;
        if self.update_interval == 0 {
            return Err(ConfigError::UpdateInterval);
        }
        parse_endpoint(&self.sub_endpoint)?;
        Ok(())
    }
}

fn validate_vlen(vlen: usize) -> Result<(), ConfigError> {
    if vlen == 0 {
        return Err(ConfigError::VectorLength(vlen));
    }
    Ok(())
}

fn load_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ConfigError> {
    let payload = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&payload).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Errors surfaced while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The config file was not valid JSON for the expected shape.
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// Vector length must be at least 1.
    #[error("vector length must be at least 1, got {0}")]
    VectorLength(usize),
    /// Sample rate must be a positive finite number.
    #[error("sample rate must be a positive number, got {0}")]
    SampleRate(f64),
    /// The generator batch must hold at least one slot.
    #[error("batch must hold at least one slot")]
    BatchSlots,
    /// The telemetry interval must cover at least one element.
    #[error("update interval must be at least 1 element")]
    UpdateInterval,
    /// The endpoint URI was rejected by the transport.
    #[error(transparent)]
    Endpoint(#[from] TransportError),
}
