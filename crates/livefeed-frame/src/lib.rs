//! Record framing for live elementary-stream feeds.
//!
//! Every payload on the wire is preceded by a fixed 12-byte header:
//! - An 8-byte big-endian presentation timestamp
//! - A 4-byte big-endian payload length
//!
//! A timestamp of all ones marks a configuration payload (codec parameter
//! sets) that carries no presentation time. There is no sync marker, no
//! checksum and no terminator: end-of-stream is a short read.

pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

#[cfg(feature = "async")]
pub mod async_codec;

#[cfg(feature = "async")]
pub use async_codec::RecordCodec;
pub use codec::{
    decode_record, encode_record, FeedConfig, Record, RecordHeader, CONFIG_TIMESTAMP,
    DEFAULT_MAX_PAYLOAD, HEADER_SIZE,
};
pub use error::{FrameError, Result};
pub use reader::RecordReader;
pub use writer::RecordWriter;
