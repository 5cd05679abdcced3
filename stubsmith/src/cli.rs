//! Command-line interface definitions for stubsmith.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Stubsmith - type stubs from the docstring signatures of compiled extension modules
#[derive(Parser, Debug)]
#[command(name = "stubsmith")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to stubsmith.toml configuration file
    #[arg(short, long, global = true, env = "STUBSMITH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output (-v, -vv for increasing verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output directory override (overrides config file)
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Variant override; `.{variant}` is stripped from recovered signatures
    #[arg(long, global = true)]
    pub variant: Option<String>,

    /// Introspection dump to read (or, for `capture`, to write)
    #[arg(long, global = true)]
    pub dump: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate stub files for the root module and its submodules
    Generate(GenerateArgs),

    /// Display the configuration and how the root module's members are classified
    Info(InfoArgs),

    /// Initialize a new stubsmith.toml configuration file
    Init(InitArgs),

    /// Snapshot a live module into an introspection dump (requires the `python` feature)
    Capture(CaptureArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    /// Generate without writing; list the modules and their sizes
    #[arg(long)]
    pub dry_run: bool,

    /// Print the generated stubs to stdout instead of writing files
    #[arg(long, conflicts_with = "dry_run")]
    pub stdout: bool,
}

#[derive(Args, Debug, Clone)]
pub struct InfoArgs {
    /// Output format
    #[arg(long, value_enum, default_value = "pretty")]
    pub format: InfoFormat,

    /// List every root member with its classification
    #[arg(long)]
    pub members: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum InfoFormat {
    /// Human-readable output
    Pretty,
    /// JSON output
    Json,
}

#[derive(Args, Debug, Clone)]
pub struct InitArgs {
    /// Overwrite existing stubsmith.toml if present
    #[arg(short, long)]
    pub force: bool,

    /// Name of the extension module to generate stubs for
    #[arg(long, default_value = "mitsuba")]
    pub root_module: String,

    /// Initialize with minimal configuration
    #[arg(long)]
    pub minimal: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CaptureArgs {
    /// Module to import (defaults to the configured python module)
    #[arg(long)]
    pub module: Option<String>,
}
