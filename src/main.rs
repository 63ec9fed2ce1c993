// CLI binary entry point for id3lens

mod cli;

use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Config, OutputFormatter};

fn main() {
    let config = Config::parse();

    let default_level = if config.verbose { "id3lens=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let formatter = OutputFormatter::new(config.format, config.quiet);
    if let Err(e) = cli::run(config.command, &formatter) {
        formatter.print_error(&format!("{e:#}"));
        process::exit(1);
    }
}
