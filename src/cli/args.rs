//! Command-line arguments and subcommands for `rclc`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::OutputFormat;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "rclc",
    version,
    about = "Compile parsed RCL agent definitions into runtime-ready agents, messages and flows."
)]
pub struct RclArgs {
    /// Project configuration file. Defaults to `rclc.yaml` next to the input.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate, extract and compile, then write the compiled agent.
    Compile {
        /// A `.ast.json` document or a directory of them.
        #[arg(required = true)]
        path: PathBuf,
        /// Output directory. Defaults to the source's directory.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output format.
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
        /// Pretty-print JSON output.
        #[arg(long)]
        pretty: bool,
        /// Also check naming conventions.
        #[arg(long)]
        naming: bool,
    },
    /// Report diagnostics without writing output.
    Validate {
        #[arg(required = true)]
        path: PathBuf,
        /// Also check naming conventions.
        #[arg(long)]
        naming: bool,
        /// Print diagnostics as JSON on stdout.
        #[arg(long)]
        json: bool,
    },
    /// Print the message catalog, even for documents with errors.
    Messages {
        #[arg(required = true)]
        path: PathBuf,
        /// Pretty-print JSON output.
        #[arg(long)]
        pretty: bool,
    },
}
