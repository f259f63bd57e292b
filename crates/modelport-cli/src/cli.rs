use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "modelport", version, about = "Model configuration resolver")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve a model configuration file and print the descriptor
    Inspect {
        /// Path to the JSON model configuration
        #[arg(long)]
        config: PathBuf,

        /// Model name (defaults to the repository directory name)
        #[arg(long)]
        name: Option<String>,

        /// Model version
        #[arg(long, default_value_t = 1)]
        version: u64,

        /// Model repository directory (defaults to the config file's directory)
        #[arg(long)]
        repository: Option<PathBuf>,

        /// Accept inputs marked `optional`
        #[arg(long)]
        allow_optional: bool,

        /// Report the model as batching along its first dimension
        #[arg(long)]
        first_dim_batching: bool,

        /// Log filter (RUST_LOG syntax)
        #[arg(long, default_value = "info")]
        log: String,
    },
}
