//! `tokio_util::codec` adapter for the record wire format.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{decode_record, encode_record, FeedConfig, Record};
use crate::error::FrameError;

/// Record codec for use with `FramedRead` / `FramedWrite`.
#[derive(Debug, Clone, Default)]
pub struct RecordCodec {
    config: FeedConfig,
}

impl RecordCodec {
    /// Create a codec with explicit configuration.
    pub fn with_config(config: FeedConfig) -> Self {
        Self { config }
    }
}

impl Decoder for RecordCodec {
    type Item = Record;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Record>, FrameError> {
        decode_record(src, self.config.max_payload_size)
    }

    // A trailing partial record is end-of-stream, not an error.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Record>, FrameError> {
        let record = self.decode(src)?;
        if record.is_none() && !src.is_empty() {
            tracing::debug!(remaining = src.len(), "discarding partial record at end of stream");
            src.clear();
        }
        Ok(record)
    }
}

impl Encoder<Record> for RecordCodec {
    type Error = FrameError;

    fn encode(&mut self, record: Record, dst: &mut BytesMut) -> Result<(), FrameError> {
        encode_record(&record, dst)
    }
}
