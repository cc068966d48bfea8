use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Record header: timestamp (8) + length (4) = 12 bytes.
pub const HEADER_SIZE: usize = 12;

/// Timestamp value marking a configuration payload.
pub const CONFIG_TIMESTAMP: u64 = u64::MAX;

/// Default maximum payload size: 64 MiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 64 * 1024 * 1024;

/// Decoded fixed-size record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    /// Raw timestamp field; [`CONFIG_TIMESTAMP`] for configuration payloads.
    pub timestamp: u64,
    /// Number of payload bytes following the header.
    pub length: u32,
}

impl RecordHeader {
    /// Parse a header from its wire representation.
    pub fn parse(raw: &[u8; HEADER_SIZE]) -> Self {
        let mut buf = &raw[..];
        Self {
            timestamp: buf.get_u64(),
            length: buf.get_u32(),
        }
    }

    /// Serialize the header to its wire representation.
    pub fn to_bytes(self) -> [u8; HEADER_SIZE] {
        let mut raw = [0u8; HEADER_SIZE];
        let mut dst = &mut raw[..];
        dst.put_u64(self.timestamp);
        dst.put_u32(self.length);
        raw
    }

    /// Whether this header announces a configuration payload.
    pub fn is_config(&self) -> bool {
        self.timestamp == CONFIG_TIMESTAMP
    }

    /// Presentation timestamp, `None` for configuration payloads.
    pub fn pts(&self) -> Option<u64> {
        (!self.is_config()).then_some(self.timestamp)
    }
}

/// A complete record: header information plus its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Presentation timestamp. `None` marks a configuration payload.
    pub pts: Option<u64>,
    /// The raw payload bytes.
    pub payload: Bytes,
}

impl Record {
    /// Create a configuration record (sentinel timestamp on the wire).
    pub fn config(payload: impl Into<Bytes>) -> Self {
        Self {
            pts: None,
            payload: payload.into(),
        }
    }

    /// Create a media record with a presentation timestamp.
    pub fn media(pts: u64, payload: impl Into<Bytes>) -> Self {
        Self {
            pts: Some(pts),
            payload: payload.into(),
        }
    }

    /// Whether this record carries configuration data.
    pub fn is_config(&self) -> bool {
        self.pts.is_none()
    }

    /// The total wire size of this record (header + payload).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }

    /// Header describing this record on the wire.
    pub fn header(&self) -> Result<RecordHeader> {
        let timestamp = match self.pts {
            None => CONFIG_TIMESTAMP,
            Some(CONFIG_TIMESTAMP) => return Err(FrameError::ReservedTimestamp),
            Some(pts) => pts,
        };
        let length = u32::try_from(self.payload.len()).map_err(|_| FrameError::PayloadTooLarge {
            size: self.payload.len(),
            max: u32::MAX as usize,
        })?;
        Ok(RecordHeader { timestamp, length })
    }
}

/// Encode a record into the wire format.
///
/// Wire format:
/// ```text
/// ┌────────────────────┬─────────────┬──────────────────┐
/// │ Timestamp (8B BE)  │ Length      │ Payload          │
/// │ all ones = config  │ (4B BE)     │ (Length bytes)   │
/// └────────────────────┴─────────────┴──────────────────┘
/// ```
pub fn encode_record(record: &Record, dst: &mut BytesMut) -> Result<()> {
    let header = record.header()?;
    dst.reserve(record.wire_size());
    dst.put_slice(&header.to_bytes());
    dst.put_slice(&record.payload);
    Ok(())
}

/// Decode a record from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete record yet.
/// On success, consumes the record bytes from the buffer.
pub fn decode_record(src: &mut BytesMut, max_payload: usize) -> Result<Option<Record>> {
    if src.len() < HEADER_SIZE {
        return Ok(None);
    }

    let mut raw = [0u8; HEADER_SIZE];
    raw.copy_from_slice(&src[..HEADER_SIZE]);
    let header = RecordHeader::parse(&raw);
    let payload_len = header.length as usize;

    if payload_len > max_payload {
        return Err(FrameError::PayloadTooLarge {
            size: payload_len,
            max: max_payload,
        });
    }

    let total = HEADER_SIZE + payload_len;
    if src.len() < total {
        src.reserve(total - src.len());
        return Ok(None);
    }

    src.advance(HEADER_SIZE);
    let payload = src.split_to(payload_len).freeze();

    Ok(Some(Record {
        pts: header.pts(),
        payload,
    }))
}

/// Configuration for record decoding.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Maximum accepted payload length in bytes. Default: 64 MiB.
    pub max_payload_size: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}
