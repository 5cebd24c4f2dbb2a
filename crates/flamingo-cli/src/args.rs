//! Command-line arguments for the `flamingo` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use flamingo_codegen::DEFAULT_RUNTIME_PATH;

#[derive(Parser, Debug)]
#[command(name = "flamingo")]
#[command(about = "Flamingo: compile component markup to Rust render functions")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Compile .flamingo files to Rust source
    Build {
        /// Input files, or directories containing .flamingo files
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Directory for generated files (default: next to each source)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Path of the renderer trait imported by generated code
        #[arg(long, default_value = DEFAULT_RUNTIME_PATH)]
        runtime: String,

        /// Omit the "do not edit" banner
        #[arg(long)]
        no_header: bool,
    },

    /// Check .flamingo files for errors without writing output
    Check {
        /// Input files, or directories containing .flamingo files
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Print the token stream of a .flamingo file
    Tokens {
        /// Input .flamingo file
        path: PathBuf,
    },
}
