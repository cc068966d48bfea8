use std::collections::TryReserveError;

use crate::control::ControlQuery;
use crate::es::SinkRejected;

/// Errors that can occur while demuxing.
///
/// End-of-stream is not an error; see [`crate::DemuxStatus::Eof`].
#[derive(Debug, thiserror::Error)]
pub enum DemuxError {
    /// Record-level error from the framing layer.
    #[error("frame error: {0}")]
    Frame(#[from] livefeed_frame::FrameError),

    /// Growing the configuration accumulator failed.
    #[error("failed to grow configuration accumulator: {0}")]
    Alloc(#[from] TryReserveError),

    /// The sink refused a forwarded unit.
    #[error("sink rejected unit: {0}")]
    Sink(SinkRejected),

    /// The sink refused to register the elementary stream.
    #[error("elementary stream registration failed: {0}")]
    EsRegistration(SinkRejected),

    /// Control query on a live, non-seekable feed.
    #[error("control query {0:?} not supported on a live feed")]
    Unsupported(ControlQuery),
}

impl DemuxError {
    /// Whether the owning session should be torn down.
    ///
    /// Only rejected control queries leave the demuxer usable.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, DemuxError::Unsupported(_))
    }
}

pub type Result<T> = std::result::Result<T, DemuxError>;
