use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use livefeed::HandoffOut;
use livefeed_demux::{Demuxer, Unit};
use livefeed_handoff::HandoffBuffer;

use crate::cmd::PlayArgs;
use crate::exit::{demux_error, io_error, CliError, CliResult, INTERNAL, SUCCESS, USAGE};
use crate::output::{print_unit, OutputFormat};

pub fn run(args: PlayArgs, format: OutputFormat) -> CliResult<i32> {
    let delay = args
        .consumer_delay
        .as_deref()
        .map(parse_duration)
        .transpose()?;
    let source = args.feed.open()?;
    let config = args.feed.config();

    let buffer = Arc::new(HandoffBuffer::<Unit>::new());
    let interrupted = Arc::new(AtomicBool::new(false));
    install_ctrlc_handler(Arc::clone(&buffer), Arc::clone(&interrupted))?;

    let producer = {
        let buffer = Arc::clone(&buffer);
        thread::Builder::new()
            .name("livefeed-demux".to_string())
            .spawn(move || {
                let result =
                    Demuxer::open_with_config(source, HandoffOut::new(Arc::clone(&buffer)), config)
                        .and_then(|mut demux| demux.run());
                buffer.stop();
                result
            })
            .map_err(|err| io_error("failed spawning demux thread", err))?
    };

    while let Some(unit) = buffer.pop() {
        if let Err(err) = print_unit(&unit, format) {
            buffer.stop();
            if err.kind() == io::ErrorKind::BrokenPipe {
                tracing::debug!("stdout closed, ending playback");
                return Ok(SUCCESS);
            }
            return Err(io_error("stdout write failed", err));
        }
        if let Some(delay) = delay {
            thread::sleep(delay);
        }
    }

    // The demux thread may be parked in a blocking read on the source.
    if interrupted.load(Ordering::SeqCst) {
        tracing::info!(stats = ?buffer.stats(), "interrupted");
        return Ok(SUCCESS);
    }

    let demux_stats = producer
        .join()
        .map_err(|_| CliError::new(INTERNAL, "demux thread panicked"))?
        .map_err(|err| demux_error("demux failed", err))?;
    let handoff_stats = buffer.stats();
    tracing::info!(
        units = demux_stats.units_forwarded,
        shown = handoff_stats.popped,
        dropped = handoff_stats.superseded,
        "play finished"
    );

    Ok(SUCCESS)
}

fn install_ctrlc_handler(
    buffer: Arc<HandoffBuffer<Unit>>,
    interrupted: Arc<AtomicBool>,
) -> CliResult<()> {
    ctrlc::set_handler(move || {
        interrupted.store(true, Ordering::SeqCst);
        buffer.stop();
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}

fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, true)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
