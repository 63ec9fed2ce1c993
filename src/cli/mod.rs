// CLI module for id3lens
//
// Command-line front end over the library: argument parsing, report
// formatting and the subcommand implementations.

pub mod commands;
pub mod config;
pub mod output;

pub use commands::run;
pub use config::Config;
pub use output::OutputFormatter;
