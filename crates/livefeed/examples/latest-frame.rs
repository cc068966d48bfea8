//! Paced live feed with a slow consumer: the consumer only ever sees the
//! newest unit, older ones are dropped in the hand-off buffer.
//!
//! Run with:
//!   cargo run --example latest-frame

use std::io::{Cursor, Read};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use livefeed::demux::{Demuxer, Unit};
use livefeed::frame::RecordWriter;
use livefeed::handoff::HandoffBuffer;
use livefeed::HandoffOut;

/// Delivers the feed one record-sized chunk at a time, like a paced socket.
struct Paced {
    inner: Cursor<Vec<u8>>,
    interval: Duration,
}

impl Read for Paced {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        thread::sleep(self.interval);
        self.inner.read(buf)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = RecordWriter::new(Vec::new());
    writer.send_config(b"\x00\x00\x00\x01\x67\x42\xc0\x1f")?;
    writer.send_config(b"\x00\x00\x00\x01\x68\xce\x3c\x80")?;
    for n in 0..60u64 {
        let nal = if n == 0 { 0x65 } else { 0x41 };
        writer.send(n * 16_666, &[0, 0, 0, 1, nal, n as u8])?;
    }

    let source = Paced {
        inner: Cursor::new(writer.into_inner()),
        interval: Duration::from_millis(2),
    };

    let buffer = Arc::new(HandoffBuffer::<Unit>::new());
    let producer = {
        let buffer = Arc::clone(&buffer);
        thread::spawn(move || {
            let result = Demuxer::open(source, HandoffOut::new(Arc::clone(&buffer)))
                .and_then(|mut demux| demux.run());
            buffer.stop();
            result
        })
    };

    while let Some(unit) = buffer.pop() {
        eprintln!("rendering pts={:?} ({} bytes)", unit.pts, unit.len());
        thread::sleep(Duration::from_millis(15));
    }

    let demux_stats = producer.join().map_err(|_| "demux thread panicked")??;
    let handoff_stats = buffer.stats();
    eprintln!(
        "forwarded {} units, rendered {}, dropped {}",
        demux_stats.units_forwarded, handoff_stats.popped, handoff_stats.superseded
    );
    Ok(())
}
