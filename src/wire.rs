use crate::sequence::SeqVector;
use thiserror::Error;

const SAMPLE_BYTES: usize = std::mem::size_of::<u64>();

/// Bytes occupied by one wire record of `vlen` samples.
pub fn record_len(vlen: usize) -> usize {
    vlen * SAMPLE_BYTES
}

/// Encodes a vector as `vlen` consecutive native-endian u64 values.
///
/// The wire format carries no framing, headers, or metadata — record
/// boundaries are a contract between publisher and subscriber via the
/// configured vector width.
pub fn encode_record(vector: &SeqVector) -> Vec<u8> {
    let mut buf = Vec::with_capacity(record_len(vector.vlen()));
    for element in vector.elements() {
        buf.extend_from_slice(&element.to_ne_bytes());
    }
    buf
}

/// Decodes a raw record, rejecting any length other than `vlen * 8` bytes.
pub fn decode_record(payload: &[u8], vlen: usize) -> Result<SeqVector, WireError> {
    let expected = record_len(vlen);
    if payload.len() != expected {
        return Err(WireError::RecordSize {
            expected,
            actual: payload.len(),
        });
    }
    let mut elements = Vec::with_capacity(vlen);
    for chunk in payload.chunks_exact(SAMPLE_BYTES) {
        let mut raw = [0u8; SAMPLE_BYTES];
        raw.copy_from_slice(chunk);
        elements.push(u64::from_ne_bytes(raw));
    }
    Ok(SeqVector::from_elements(elements))
}

/// Errors surfaced while decoding wire records.
#[derive(Debug, Error)]
pub enum WireError {
    /// Record length did not match the configured vector width.
    #[error("record of {actual} bytes does not hold a {expected}-byte vector")]
    RecordSize { expected: usize, actual: usize },
}
