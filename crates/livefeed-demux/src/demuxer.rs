use std::fmt::Write as _;
use std::io::Read;

use bytes::Bytes;
use livefeed_frame::{FeedConfig, RecordReader};
use tracing::{debug, trace, warn};

use crate::control::{Capabilities, ControlQuery};
use crate::error::{DemuxError, Result};
use crate::es::{EsFormat, EsId, EsOut};
use crate::unit::Unit;

/// Bytes of the first unit dumped at trace level.
const FIRST_UNIT_PREVIEW: usize = 128;

/// Outcome of one [`Demuxer::process_next`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemuxStatus {
    /// A record was consumed; call again.
    Continue,
    /// The source is exhausted or failed; the session is over.
    Eof,
}

/// Whether configuration data is waiting for the next media record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemuxState {
    Idle,
    Accumulating,
}

/// Per-session counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DemuxStats {
    pub records_read: u64,
    pub config_records: u64,
    pub units_forwarded: u64,
    /// Forwarded units that carried accumulated configuration data.
    pub merged_units: u64,
    pub bytes_forwarded: u64,
}

/// Demuxer for a live, non-seekable feed of framed H.264 records.
///
/// Not internally synchronized; a single driver thread calls
/// [`process_next`](Self::process_next) repeatedly.
pub struct Demuxer<R, O> {
    reader: RecordReader<R>,
    out: O,
    es: EsId,
    pending: Option<Vec<u8>>,
    stats: DemuxStats,
}

impl<R: Read, O: EsOut> Demuxer<R, O> {
    /// Short name, as used for module selection and in logs.
    pub const NAME: &'static str = "h264_0latency";

    /// Open a session with default configuration.
    pub fn open(source: R, out: O) -> Result<Self> {
        Self::open_with_config(source, out, FeedConfig::default())
    }

    /// Open a session: register the single H.264 video stream with the sink.
    pub fn open_with_config(source: R, mut out: O, config: FeedConfig) -> Result<Self> {
        let format = EsFormat::h264_video();
        let es = out.add(&format).map_err(DemuxError::EsRegistration)?;
        debug!(
            demux = Self::NAME,
            %es,
            codec = %format.codec,
            max_payload = config.max_payload_size,
            "opened demux session"
        );

        Ok(Self {
            reader: RecordReader::with_config(source, config),
            out,
            es,
            pending: None,
            stats: DemuxStats::default(),
        })
    }

    /// Read one record and forward at most one unit.
    pub fn process_next(&mut self) -> Result<DemuxStatus> {
        let Some(record) = self.reader.read_record()? else {
            debug!(demux = Self::NAME, stats = ?self.stats, "end of stream");
            return Ok(DemuxStatus::Eof);
        };
        self.stats.records_read += 1;

        let is_config = record.is_config();
        let unit = Unit::new(record.pts, record.payload);

        if is_config {
            self.stats.config_records += 1;
        }

        if !is_config && self.pending.is_none() {
            self.forward(unit)?;
            return Ok(DemuxStatus::Continue);
        }

        self.accumulate(&unit.payload)?;

        if is_config {
            trace!(
                pending = self.pending.as_ref().map_or(0, Vec::len),
                "holding configuration for next unit"
            );
            return Ok(DemuxStatus::Continue);
        }

        if let Some(pending) = self.pending.take() {
            self.stats.merged_units += 1;
            self.forward(finish_merge(pending, unit))?;
        }
        Ok(DemuxStatus::Continue)
    }

    /// Drive the session until end-of-stream.
    pub fn run(&mut self) -> Result<DemuxStats> {
        while self.process_next()? == DemuxStatus::Continue {}
        Ok(self.stats)
    }

    /// Live feeds answer no control query: always
    /// [`DemuxError::Unsupported`], leaving the session untouched.
    pub fn control(&mut self, query: ControlQuery) -> Result<()> {
        debug!(demux = Self::NAME, ?query, "rejecting control query");
        Err(DemuxError::Unsupported(query))
    }

    /// Runtime capabilities: none.
    pub fn capabilities(&self) -> Capabilities {
        Capabilities::NONE
    }

    pub fn state(&self) -> DemuxState {
        if self.pending.is_some() {
            DemuxState::Accumulating
        } else {
            DemuxState::Idle
        }
    }

    pub fn stats(&self) -> DemuxStats {
        self.stats
    }

    /// Stream id assigned by the sink at open time.
    pub fn es_id(&self) -> EsId {
        self.es
    }

    /// Borrow the sink.
    pub fn sink(&self) -> &O {
        &self.out
    }

    /// End the session, dropping any unmerged configuration data.
    pub fn close(self) -> (R, O) {
        if let Some(pending) = &self.pending {
            debug!(
                demux = Self::NAME,
                bytes = pending.len(),
                "discarding unmerged configuration data"
            );
        }
        (self.reader.into_inner(), self.out)
    }

    fn accumulate(&mut self, payload: &[u8]) -> Result<()> {
        match self.pending.as_mut() {
            Some(pending) => {
                pending.try_reserve(payload.len())?;
                pending.extend_from_slice(payload);
            }
            None => {
                let mut pending = Vec::new();
                pending.try_reserve_exact(payload.len())?;
                pending.extend_from_slice(payload);
                self.pending = Some(pending);
            }
        }
        Ok(())
    }

    fn forward(&mut self, unit: Unit) -> Result<()> {
        if self.stats.units_forwarded == 0 && tracing::enabled!(tracing::Level::TRACE) {
            trace!(
                len = unit.len(),
                head = %hex_preview(&unit.payload, FIRST_UNIT_PREVIEW),
                "first unit"
            );
        }

        let len = unit.len();
        let pts = unit.pts;
        self.out.send(self.es, unit).map_err(|err| {
            warn!(demux = Self::NAME, error = %err, "sink rejected unit");
            DemuxError::Sink(err)
        })?;

        self.stats.units_forwarded += 1;
        self.stats.bytes_forwarded += len as u64;
        trace!(?pts, len, "forwarded unit");
        Ok(())
    }
}

/// Wrap the accumulated bytes, which already end with the trigger's payload,
/// in a unit carrying the trigger's timing and flags.
fn finish_merge(merged: Vec<u8>, trigger: Unit) -> Unit {
    Unit {
        payload: Bytes::from(merged),
        pts: trigger.pts,
        dts: trigger.dts,
        flags: trigger.flags,
    }
}

fn hex_preview(bytes: &[u8], limit: usize) -> String {
    let mut out = String::with_capacity(limit.min(bytes.len()) * 3);
    for (i, byte) in bytes.iter().take(limit).enumerate() {
        if i > 0 {
            out.push(if i % 16 == 0 { '\n' } else { ' ' });
        }
        let _ = write!(out, "{byte:02x}");
    }
    out
}
