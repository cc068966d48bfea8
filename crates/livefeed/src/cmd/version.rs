use livefeed_demux::Demuxer;
use livefeed_frame::{DEFAULT_MAX_PAYLOAD, HEADER_SIZE};

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("livefeed {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: livefeed");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("LIVEFEED_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "profile: {}",
        option_env!("LIVEFEED_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!(
        "demuxer: {}",
        Demuxer::<std::io::Empty, livefeed::HandoffOut>::NAME
    );
    println!("header_size: {HEADER_SIZE}");
    println!("default_max_payload: {DEFAULT_MAX_PAYLOAD}");
    println!("features: async={}, cli=true", cfg!(feature = "async"));

    Ok(SUCCESS)
}
