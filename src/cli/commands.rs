//! CLI command definitions

use clap::Args;

/// Run a provisioning pipeline
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Path to provisioning YAML file
    #[arg(short, long)]
    pub file: String,

    /// Create-cluster parameter overrides (key=value)
    #[arg(long = "set", value_parser = parse_key_value)]
    pub overrides: Vec<(String, String)>,

    /// Validate create-cluster parameters before applying
    #[arg(long)]
    pub strict: bool,
}

/// Validate a provisioning configuration
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to provisioning YAML file
    #[arg(short, long)]
    pub file: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Print the cluster manifests without applying them
#[derive(Debug, Args, Clone)]
pub struct RenderCommand {
    /// Path to provisioning YAML file
    #[arg(short, long)]
    pub file: String,

    /// Create-cluster parameter overrides (key=value)
    #[arg(long = "set", value_parser = parse_key_value)]
    pub overrides: Vec<(String, String)>,
}

/// Parse key=value pairs
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("Invalid key=value pair: {}", s)),
    }
}
