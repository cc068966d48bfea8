use std::io::{ErrorKind, Read};

use bytes::Bytes;
use tracing::{debug, trace};

use crate::codec::{FeedConfig, Record, RecordHeader, HEADER_SIZE};
use crate::error::Result;

/// Upper bound on the up-front payload allocation; larger payloads grow as
/// bytes actually arrive.
const INITIAL_PAYLOAD_CAPACITY: usize = 64 * 1024;

/// Reads complete records from any blocking `Read` source.
///
/// Reads exactly one header and then exactly the declared payload, never
/// ahead, so the source stays positioned on a record boundary.
/// End-of-stream (a short or failed read) is reported as `Ok(None)`.
pub struct RecordReader<T> {
    inner: T,
    config: FeedConfig,
}

impl<T: Read> RecordReader<T> {
    /// Create a new record reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FeedConfig::default())
    }

    /// Create a new record reader with explicit configuration.
    pub fn with_config(inner: T, config: FeedConfig) -> Self {
        Self { inner, config }
    }

    /// Read the next complete record (blocking).
    ///
    /// Returns `Ok(None)` at end-of-stream, including a stream that ends
    /// inside a header or a payload; the partial record is discarded. A
    /// header declaring more than `max_payload_size` bytes also ends the
    /// stream, without reading its payload.
    pub fn read_record(&mut self) -> Result<Option<Record>> {
        let Some(header) = self.read_header() else {
            return Ok(None);
        };

        let len = header.length as usize;
        if len > self.config.max_payload_size {
            debug!(
                length = len,
                max = self.config.max_payload_size,
                "declared payload exceeds limit, treating as end of stream"
            );
            return Ok(None);
        }

        let Some(payload) = self.read_payload(len) else {
            return Ok(None);
        };

        trace!(
            timestamp = header.timestamp,
            length = len,
            config = header.is_config(),
            "read record"
        );

        Ok(Some(Record {
            pts: header.pts(),
            payload,
        }))
    }

    fn read_header(&mut self) -> Option<RecordHeader> {
        let mut raw = [0u8; HEADER_SIZE];
        let mut filled = 0usize;
        while filled < HEADER_SIZE {
            match self.inner.read(&mut raw[filled..]) {
                Ok(0) => {
                    if filled > 0 {
                        debug!(filled, "stream ended inside record header");
                    }
                    return None;
                }
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => {
                    debug!(error = %err, "header read failed, treating as end of stream");
                    return None;
                }
            }
        }
        Some(RecordHeader::parse(&raw))
    }

    fn read_payload(&mut self, len: usize) -> Option<Bytes> {
        let mut payload = Vec::with_capacity(len.min(INITIAL_PAYLOAD_CAPACITY));
        match (&mut self.inner).take(len as u64).read_to_end(&mut payload) {
            Ok(_) if payload.len() == len => Some(Bytes::from(payload)),
            Ok(_) => {
                debug!(
                    expected = len,
                    received = payload.len(),
                    "stream ended inside record payload"
                );
                None
            }
            Err(err) => {
                debug!(error = %err, "payload read failed, treating as end of stream");
                None
            }
        }
    }

    /// Borrow the underlying source.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying source.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner source.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update maximum payload size for subsequent records.
    pub fn set_max_payload_size(&mut self, max_payload_size: usize) {
        self.config.max_payload_size = max_payload_size;
    }

    /// Current reader configuration.
    pub fn config(&self) -> &FeedConfig {
        &self.config
    }
}
