//! # mkpp3 command-line entry point
//!
//! ```text
//! main()
//!   │
//!   ├─> Initialize logging (stderr + rolling files)
//!   ├─> Parse CLI arguments (clap)
//!   ├─> Create Tokio runtime
//!   └─> Execute the subcommand
//! ```
//!
//! ```bash
//! mkpp3 write fizz buzz/sam --event ExpoCon
//! mkpp3 script saturday.txt --event ExpoCon
//! mkpp3 tags fizz --event ExpoCon
//! mkpp3 show fizz
//! ```

#![warn(clippy::all, rust_2018_idioms)]
#![expect(clippy::print_stdout)] // Command output goes to stdout

mod cli;

use anyhow::Result;
use clap::Parser as _;
use mkpp3::logging;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Best effort.
    if let Err(e) = logging::init() {
        warn_no_logging(&e);
    }

    let result =
        tokio::runtime::Runtime::new()?.block_on(cli::run_command(&cli.settings, cli.command));
    if let Err(e) = &result {
        tracing::error!("{e:#}");
        if let Ok(path) = logging::get_current_log_path() {
            tracing::info!("Details in {}", path.display());
        }
    }
    result
}

#[expect(clippy::print_stderr)]
fn warn_no_logging(e: &anyhow::Error) {
    eprintln!("Logging disabled: {e:#}");
}
