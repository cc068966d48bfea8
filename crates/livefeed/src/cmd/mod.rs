use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use livefeed_frame::{FeedConfig, DEFAULT_MAX_PAYLOAD};

use crate::exit::{io_error, CliResult};
use crate::output::OutputFormat;

pub mod demux;
pub mod pack;
pub mod play;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Demux a framed feed and print every unit.
    Demux(DemuxArgs),
    /// Demux on a producer thread and show only the newest unit.
    Play(PlayArgs),
    /// Build a framed feed from payload files.
    Pack(PackArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Demux(args) => demux::run(args, format),
        Command::Play(args) => play::run(args, format),
        Command::Pack(args) => pack::run(args),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct FeedArgs {
    /// Feed to read; stdin when omitted or `-`.
    pub path: Option<PathBuf>,
    /// Largest accepted payload in bytes.
    #[arg(long, env = "LIVEFEED_MAX_PAYLOAD", default_value_t = DEFAULT_MAX_PAYLOAD)]
    pub max_payload: usize,
}

impl FeedArgs {
    pub fn config(&self) -> FeedConfig {
        FeedConfig {
            max_payload_size: self.max_payload,
        }
    }

    pub fn open(&self) -> CliResult<Box<dyn Read + Send>> {
        match self.path.as_deref() {
            None => Ok(Box::new(std::io::stdin())),
            Some(path) if path == Path::new("-") => Ok(Box::new(std::io::stdin())),
            Some(path) => {
                let file = File::open(path).map_err(|err| {
                    io_error(&format!("failed opening {}", path.display()), err)
                })?;
                Ok(Box::new(BufReader::new(file)))
            }
        }
    }
}

#[derive(Args, Debug)]
pub struct DemuxArgs {
    #[command(flatten)]
    pub feed: FeedArgs,
    /// Exit after printing N units.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct PlayArgs {
    #[command(flatten)]
    pub feed: FeedArgs,
    /// Time the consumer spends on each unit (e.g. 40ms, 1s).
    #[arg(long)]
    pub consumer_delay: Option<String>,
}

#[derive(Args, Debug)]
pub struct PackArgs {
    /// Records in stream order: `config:FILE` or `PTS:FILE`.
    #[arg(required = true, value_parser = pack::parse_item)]
    pub items: Vec<pack::PackItem>,
    /// Write the feed here instead of stdout.
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
