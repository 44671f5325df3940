//! CLI entry point for wave function collapse tile map generation

use clap::Parser;
use tilecollapse::io::cli::{Cli, MapGenerator};

// Allow print for the final summary line
#[allow(clippy::print_stderr)]
fn main() -> tilecollapse::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let quiet = cli.quiet;
    let summary = MapGenerator::new(cli).run()?;
    if !quiet {
        eprintln!(
            "{} -> {} ({})",
            summary.statistics,
            summary.output.display(),
            summary.status
        );
    }
    Ok(())
}
