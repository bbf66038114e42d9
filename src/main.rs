//! Fixture harness CLI
//!
//! Runs every test file given on the command line (directories are scanned
//! recursively) and exits nonzero if any case fails.

use std::path::PathBuf;

use clap::Parser;
use fixture_harness::common::logging;
use fixture_harness::{cli, Error};

#[derive(Parser)]
#[command(name = "fixture-harness", about = "Declarative fixture-based test harness")]
#[command(version, long_about = None)]
struct Cli {
    /// Test files, or directories to scan for test files
    paths: Vec<PathBuf>,
}

#[tokio::main]
async fn main() {
    logging::init_cli();

    let cli = Cli::parse();

    match cli::dispatch(&cli.paths).await {
        Ok(report) if report.is_success() => {}
        Ok(_) => std::process::exit(1),
        Err(Error::Usage) => {
            println!("{}", cli::USAGE);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
