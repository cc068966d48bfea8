use std::io;

use livefeed_demux::{
    DemuxError, DemuxStatus, Demuxer, EsFormat, EsId, EsOut, SinkRejected, Unit,
};

use crate::cmd::DemuxArgs;
use crate::exit::{demux_error, CliResult, SUCCESS};
use crate::output::{print_unit, OutputFormat};

/// Prints every unit as it is forwarded.
///
/// A failed stdout write rejects the unit, which ends the demux session.
struct PrintOut {
    format: OutputFormat,
    printed: usize,
    closed: bool,
}

impl EsOut for PrintOut {
    fn add(&mut self, format: &EsFormat) -> Result<EsId, SinkRejected> {
        tracing::debug!(codec = %format.codec, "printing elementary stream");
        Ok(EsId(0))
    }

    fn send(&mut self, _es: EsId, unit: Unit) -> Result<(), SinkRejected> {
        print_unit(&unit, self.format).map_err(|err| {
            self.closed = err.kind() == io::ErrorKind::BrokenPipe;
            SinkRejected::new(format!("stdout write failed: {err}"))
        })?;
        self.printed += 1;
        Ok(())
    }
}

pub fn run(args: DemuxArgs, format: OutputFormat) -> CliResult<i32> {
    let source = args.feed.open()?;
    let out = PrintOut {
        format,
        printed: 0,
        closed: false,
    };
    let mut demux = Demuxer::open_with_config(source, out, args.feed.config())
        .map_err(|err| demux_error("open failed", err))?;

    loop {
        if let Some(count) = args.count {
            if demux.sink().printed >= count {
                break;
            }
        }

        match demux.process_next() {
            Ok(DemuxStatus::Continue) => {}
            Ok(DemuxStatus::Eof) => break,
            // Reader went away (e.g. `| head`): stop reading the source.
            Err(DemuxError::Sink(_)) if demux.sink().closed => {
                tracing::debug!("stdout closed, ending demux");
                break;
            }
            Err(err) => return Err(demux_error("demux failed", err)),
        }
    }

    let stats = demux.stats();
    tracing::info!(
        records = stats.records_read,
        config_records = stats.config_records,
        units = stats.units_forwarded,
        merged = stats.merged_units,
        bytes = stats.bytes_forwarded,
        "demux finished"
    );

    Ok(SUCCESS)
}
