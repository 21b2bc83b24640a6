//! Command-line interface

pub mod commands;
pub mod output;
pub mod status;

use clap::{Parser, Subcommand};
use commands::{RenderCommand, RunCommand, ValidateCommand};
use std::ffi::OsString;

/// Provisioning tool for bring-your-own-host Kubernetes clusters
#[derive(Debug, Parser, Clone)]
#[command(name = "provision")]
#[command(version)]
#[command(about = "Provision bring-your-own-host Kubernetes clusters", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print phases line by line instead of drawing spinners
    #[arg(long, global = true)]
    pub plain: bool,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run a provisioning pipeline
    Run(RunCommand),

    /// Validate a provisioning configuration
    Validate(ValidateCommand),

    /// Print the cluster manifests without applying them
    Render(RenderCommand),
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
