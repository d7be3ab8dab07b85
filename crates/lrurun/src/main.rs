//! lrurun - replay cache command scripts against an LRU cache

mod error;
mod script;
mod session;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::session::Session;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Cache capacity (number of entries, at least 1)
    #[arg(short, long, default_value_t = 128, allow_negative_numbers = true)]
    capacity: i64,

    /// Script to replay (reads stdin when omitted)
    script: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries only command responses
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    info!("Starting lrurun v{}", env!("CARGO_PKG_VERSION"));
    info!("Cache capacity: {}", args.capacity);

    let mut session = Session::new(args.capacity).context("Failed to create cache")?;
    let input = open_script(args.script.as_deref())?;
    let executed = session.run(input, io::stdout().lock())?;

    let stats = session.cache().stats();
    info!(
        executed,
        entries = session.cache().len(),
        hits = stats.hits(),
        misses = stats.misses(),
        evictions = stats.evictions(),
        "Script finished"
    );

    Ok(())
}

fn open_script(path: Option<&Path>) -> Result<Box<dyn BufRead>> {
    match path {
        Some(path) => {
            info!("Reading script from {}", path.display());
            let file = File::open(path)
                .with_context(|| format!("Failed to open script {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => {
            info!("Reading script from stdin");
            Ok(Box::new(io::stdin().lock()))
        }
    }
}
