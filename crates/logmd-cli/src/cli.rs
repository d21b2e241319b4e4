//! CLI argument definitions for the logger-metadata tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "logmd",
    version,
    about = "Datalogger metadata tool - validate and inspect logger descriptions",
    long_about = "Validate datalogger metadata documents and inspect the tables,\n\
                  columns, and derived views they describe.\n\n\
                  Documents are checked structurally against a JSON Schema and then\n\
                  cross-referenced (variants, sensors, primary keys, time ranges)."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate one or more metadata files, reporting every violation.
    Validate(ValidateArgs),

    /// Load a metadata file and print its normalized form as JSON.
    Dump(DumpArgs),

    /// Apply a table's view mapping and print the projected columns.
    View(ViewArgs),
}

#[derive(Parser)]
pub struct ValidateArgs {
    /// Metadata files to validate.
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Parser)]
pub struct DumpArgs {
    /// Metadata file to load.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Parser)]
pub struct ViewArgs {
    /// Metadata file to load.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Table whose mapping to apply.
    #[arg(value_name = "TABLE")]
    pub table: String,

    /// Name of the view mapping.
    #[arg(value_name = "MAPPING")]
    pub mapping: String,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
