use std::sync::Arc;

use livefeed_demux::{EsFormat, EsId, EsOut, SinkRejected, Unit};
use livefeed_handoff::HandoffBuffer;

/// [`EsOut`] that publishes every unit into a [`HandoffBuffer`].
///
/// Lets a demuxer run on its own thread while a consumer only ever sees the
/// newest unit. Once the buffer is stopped, further units are rejected, which
/// ends the demux session.
///
/// Units are still compressed here, so latest-wins applies to access units:
/// a merged unit carrying the parameter sets can be superseded before the
/// consumer takes it. Consumers that feed a decoder must either keep up with
/// the feed or get the parameter sets by other means (for example by keeping
/// the bytes of the first unit they see). Dropping only fits consumers that
/// tolerate missing units, such as previews and monitors.
#[derive(Debug)]
pub struct HandoffOut {
    buffer: Arc<HandoffBuffer<Unit>>,
    es: Option<EsId>,
}

impl HandoffOut {
    pub fn new(buffer: Arc<HandoffBuffer<Unit>>) -> Self {
        Self { buffer, es: None }
    }

    /// The buffer units are published into.
    pub fn buffer(&self) -> &Arc<HandoffBuffer<Unit>> {
        &self.buffer
    }
}

impl EsOut for HandoffOut {
    fn add(&mut self, format: &EsFormat) -> Result<EsId, SinkRejected> {
        if self.es.is_some() {
            return Err(SinkRejected::new("hand-off output carries a single stream"));
        }
        let es = EsId(0);
        self.es = Some(es);
        tracing::debug!(%es, codec = %format.codec, "hand-off output registered stream");
        Ok(es)
    }

    fn send(&mut self, es: EsId, unit: Unit) -> Result<(), SinkRejected> {
        if self.es != Some(es) {
            return Err(SinkRejected::new(format!("unknown stream {es}")));
        }
        if self.buffer.is_stopped() {
            return Err(SinkRejected::new("consumer stopped"));
        }
        self.buffer.push(unit);
        Ok(())
    }
}
