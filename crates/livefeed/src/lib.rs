//! Low-latency primitives for live H.264 ingestion.
//!
//! # Crate Structure
//!
//! - [`frame`]: Timestamp/length record framing of the live feed
//! - [`demux`]: Zero-latency demuxer merging configuration into the next unit
//! - [`handoff`]: Single-slot latest-wins exchange between two threads
//! - [`HandoffOut`]: Demuxer sink that publishes units into a hand-off buffer

pub mod bridge;

pub use bridge::HandoffOut;

/// Re-export frame types.
pub mod frame {
    pub use livefeed_frame::*;
}

/// Re-export demux types.
pub mod demux {
    pub use livefeed_demux::*;
}

/// Re-export hand-off types.
pub mod handoff {
    pub use livefeed_handoff::*;
}
