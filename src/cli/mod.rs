//! Command-line interface

pub mod output;

use crate::core::DEFAULT_MANIFEST;
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

/// Run a sequence of containerized tasks against the local container engine
#[derive(Debug, Parser, Clone)]
#[command(name = "docker-pipeline")]
#[command(author = "Pipeline Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Run a sequence of containerized tasks against the local container engine", long_about = None)]
pub struct Cli {
    /// The manifest that describes the pipeline tasks
    #[arg(short, long, default_value = DEFAULT_MANIFEST)]
    pub manifest: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Hide image pull progress
    #[arg(short, long)]
    pub quiet: bool,

    /// Container engine endpoint (defaults to DOCKER_HOST or the local socket)
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Extra arguments passed through to the pipeline
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}
