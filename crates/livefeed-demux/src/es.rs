use std::fmt;

use crate::unit::Unit;

/// Broad category of an elementary stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EsCategory {
    Video,
    Audio,
}

/// Codec carried by an elementary stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Codec {
    /// H.264 / AVC, Annex B byte stream.
    H264,
}

impl Codec {
    /// Four character code.
    pub fn fourcc(self) -> &'static str {
        match self {
            Codec::H264 => "h264",
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.fourcc())
    }
}

/// Format announced to the sink when an elementary stream is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EsFormat {
    pub category: EsCategory,
    pub codec: Codec,
}

impl EsFormat {
    /// H.264 video, the only format the live feed carries.
    pub const fn h264_video() -> Self {
        Self {
            category: EsCategory::Video,
            codec: Codec::H264,
        }
    }
}

/// Identifier handed out by the sink for a registered elementary stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EsId(pub u32);

impl fmt::Display for EsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "es#{}", self.0)
    }
}

/// The sink refused a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct SinkRejected {
    pub reason: String,
}

impl SinkRejected {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Elementary-stream output: the decoder-facing side of a demuxer.
pub trait EsOut {
    /// Register an elementary stream of the given format.
    fn add(&mut self, format: &EsFormat) -> Result<EsId, SinkRejected>;

    /// Accept one unit for a registered stream. Ownership moves to the sink.
    fn send(&mut self, es: EsId, unit: Unit) -> Result<(), SinkRejected>;
}

impl<T: EsOut + ?Sized> EsOut for &mut T {
    fn add(&mut self, format: &EsFormat) -> Result<EsId, SinkRejected> {
        (**self).add(format)
    }

    fn send(&mut self, es: EsId, unit: Unit) -> Result<(), SinkRejected> {
        (**self).send(es, unit)
    }
}

impl<T: EsOut + ?Sized> EsOut for Box<T> {
    fn add(&mut self, format: &EsFormat) -> Result<EsId, SinkRejected> {
        (**self).add(format)
    }

    fn send(&mut self, es: EsId, unit: Unit) -> Result<(), SinkRejected> {
        (**self).send(es, unit)
    }
}
