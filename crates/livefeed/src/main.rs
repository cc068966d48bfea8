mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "livefeed", version, about = "Low-latency live H.264 feed tools")]
struct Cli {
    /// Unit output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_demux_subcommand() {
        let cli = Cli::try_parse_from(["livefeed", "demux", "feed.bin", "--count", "3"])
            .expect("demux args should parse");

        match cli.command {
            Command::Demux(args) => {
                assert_eq!(args.count, Some(3));
                assert_eq!(args.feed.path.as_deref(), Some(std::path::Path::new("feed.bin")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn demux_reads_stdin_by_default() {
        let cli = Cli::try_parse_from(["livefeed", "--format", "raw", "demux"])
            .expect("demux args should parse");
        assert!(matches!(cli.format, Some(OutputFormat::Raw)));
        assert!(matches!(cli.command, Command::Demux(ref args) if args.feed.path.is_none()));
    }

    #[test]
    fn parses_pack_items_in_order() {
        let cli = Cli::try_parse_from([
            "livefeed", "pack", "config:sps", "config:pps", "0:idr", "-o", "out.bin",
        ])
        .expect("pack args should parse");

        let Command::Pack(args) = cli.command else {
            panic!("expected pack");
        };
        let pts: Vec<Option<u64>> = args.items.iter().map(|item| item.pts).collect();
        assert_eq!(pts, vec![None, None, Some(0)]);
    }

    #[test]
    fn rejects_bad_pack_item() {
        let err = Cli::try_parse_from(["livefeed", "pack", "idr.bin"])
            .expect_err("item without kind should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn parses_play_subcommand() {
        let cli = Cli::try_parse_from(["livefeed", "play", "-", "--consumer-delay", "40ms"])
            .expect("play args should parse");
        assert!(matches!(cli.command, Command::Play(_)));
    }
}
