use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use livefeed_frame::{Record, RecordWriter, CONFIG_TIMESTAMP};

use crate::cmd::PackArgs;
use crate::exit::{frame_error, io_error, CliResult, SUCCESS};

/// One record to pack: a payload file and its timestamp (`None` = config).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackItem {
    pub pts: Option<u64>,
    pub path: PathBuf,
}

pub fn parse_item(input: &str) -> Result<PackItem, String> {
    let (kind, path) = input
        .split_once(':')
        .ok_or_else(|| format!("expected `config:FILE` or `PTS:FILE`, got `{input}`"))?;
    if path.is_empty() {
        return Err(format!("missing payload file in `{input}`"));
    }

    let pts = if kind.eq_ignore_ascii_case("config") {
        None
    } else {
        let pts: u64 = kind
            .parse()
            .map_err(|_| format!("invalid timestamp `{kind}`"))?;
        if pts == CONFIG_TIMESTAMP {
            return Err(format!("timestamp {pts} is reserved for configuration records"));
        }
        Some(pts)
    };

    Ok(PackItem {
        pts,
        path: PathBuf::from(path),
    })
}

pub fn run(args: PackArgs) -> CliResult<i32> {
    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path).map_err(|err| {
            io_error(&format!("failed creating {}", path.display()), err)
        })?)),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut writer = RecordWriter::new(sink);

    for item in &args.items {
        let payload = fs::read(&item.path)
            .map_err(|err| io_error(&format!("failed reading {}", item.path.display()), err))?;
        let record = match item.pts {
            Some(pts) => Record::media(pts, payload),
            None => Record::config(payload),
        };
        writer
            .write_record(&record)
            .map_err(|err| frame_error("write failed", err))?;
        tracing::debug!(
            pts = ?item.pts,
            size = record.payload.len(),
            path = %item.path.display(),
            "packed record"
        );
    }
    writer
        .flush()
        .map_err(|err| frame_error("flush failed", err))?;

    Ok(SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_config_and_media_items() {
        assert_eq!(
            parse_item("config:sps.bin").unwrap(),
            PackItem {
                pts: None,
                path: PathBuf::from("sps.bin"),
            }
        );
        assert_eq!(
            parse_item("3600:frames/0001.h264").unwrap(),
            PackItem {
                pts: Some(3600),
                path: PathBuf::from("frames/0001.h264"),
            }
        );
    }

    #[test]
    fn rejects_malformed_items() {
        assert!(parse_item("sps.bin").is_err());
        assert!(parse_item("config:").is_err());
        assert!(parse_item("soon:x.bin").is_err());
        assert!(parse_item("18446744073709551615:x.bin").is_err());
    }
}
