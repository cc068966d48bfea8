use std::fmt::Write as _;
use std::io::{self, IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use livefeed_demux::{Codec, Unit};
use serde::Serialize;

/// Leading payload bytes shown in non-raw output.
const HEAD_BYTES: usize = 8;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    /// Payload bytes only: the elementary stream itself.
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct UnitOutput<'a> {
    codec: &'a str,
    pts: Option<u64>,
    dts: Option<u64>,
    flags: u32,
    size: usize,
    head: String,
}

/// Write one unit to stdout. Errors (a closed pipe included) are returned so
/// the caller can end the session.
pub fn print_unit(unit: &Unit, format: OutputFormat) -> io::Result<()> {
    let mut out = io::stdout().lock();
    write_unit(&mut out, unit, format)?;
    out.flush()
}

fn write_unit<W: Write>(out: &mut W, unit: &Unit, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            let line = UnitOutput {
                codec: Codec::H264.fourcc(),
                pts: unit.pts,
                dts: unit.dts,
                flags: unit.flags.bits(),
                size: unit.len(),
                head: hex_head(unit.payload.as_ref()),
            };
            serde_json::to_writer(&mut *out, &line)?;
            out.write_all(b"\n")
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PTS", "SIZE", "FLAGS", "HEAD"])
                .add_row(vec![
                    timestamp(unit.pts),
                    unit.len().to_string(),
                    format!("{:#x}", unit.flags.bits()),
                    hex_head(unit.payload.as_ref()),
                ]);
            writeln!(out, "{table}")
        }
        OutputFormat::Pretty => writeln!(
            out,
            "pts={} size={} head={}",
            timestamp(unit.pts),
            unit.len(),
            hex_head(unit.payload.as_ref())
        ),
        OutputFormat::Raw => out.write_all(unit.payload.as_ref()),
    }
}

fn timestamp(pts: Option<u64>) -> String {
    pts.map_or_else(|| "-".to_string(), |pts| pts.to_string())
}

fn hex_head(payload: &[u8]) -> String {
    let mut head = String::with_capacity(HEAD_BYTES * 3 + 3);
    for (i, byte) in payload.iter().take(HEAD_BYTES).enumerate() {
        if i > 0 {
            head.push(' ');
        }
        let _ = write!(head, "{byte:02x}");
    }
    if payload.len() > HEAD_BYTES {
        head.push_str(" ..");
    }
    head
}
