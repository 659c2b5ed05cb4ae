use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use rootlink::materialize;

/// Build a minimal container root for a binary by hard-linking it and
/// its shared library dependencies under a destination directory.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Dynamically linked executable to place under <DESTINATION>/bin
    binary: PathBuf,

    /// Root of the container tree to build
    destination: PathBuf,

    /// Log skipped and already-linked entries to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .format_timestamp(None)
        .format_target(false)
        .init();

    materialize(&args.binary, &args.destination)
}
