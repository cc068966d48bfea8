//! Zero-latency demuxer for timestamp/length framed H.264 feeds.
//!
//! Each call to [`Demuxer::process_next`] reads one record and forwards it to
//! the [`EsOut`] sink as soon as it is complete. Configuration records
//! (sentinel timestamp) are never sent alone: they are accumulated and
//! prepended to the next media record, which lends the merged unit its
//! timing and flags.

pub mod control;
pub mod demuxer;
pub mod error;
pub mod es;
pub mod unit;

pub use control::{Capabilities, ControlQuery};
pub use demuxer::{DemuxState, DemuxStats, DemuxStatus, Demuxer};
pub use error::{DemuxError, Result};
pub use es::{Codec, EsCategory, EsFormat, EsId, EsOut, SinkRejected};
pub use unit::{Unit, UnitFlags};
