use anyhow::{Context, Result};
use provision::cli::commands::{RenderCommand, RunCommand, ValidateCommand};
use provision::cli::output::*;
use provision::cli::status::{StatusMode, TerminalStatus};
use provision::cli::{Cli, Command};
use provision::core::config::ProvisionConfig;
use provision::core::{ActionContext, LogStatus, NodeProvider, StatusReporter};
use provision::execution::{ExecutionEngine, ExecutionEvent};
use std::sync::Arc;
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    // Execute command
    match &cli.command {
        Command::Run(cmd) => run_pipeline(cmd, cli.plain).await?,
        Command::Validate(cmd) => validate_config(cmd)?,
        Command::Render(cmd) => render_manifests(cmd)?,
    }

    Ok(())
}

/// Load a config file and apply `--set` overrides
fn load_config(file: &str, overrides: &[(String, String)]) -> Result<ProvisionConfig> {
    let mut config =
        ProvisionConfig::from_file(file).context("Failed to load provisioning config")?;

    for (key, value) in overrides {
        config.apply_override(key, value)?;
        eprintln!(
            "{} Override: {} = {}",
            INFO,
            style(key).cyan(),
            style(value).dim()
        );
    }

    Ok(config)
}

async fn run_pipeline(cmd: &RunCommand, plain: bool) -> Result<()> {
    let mut config = load_config(&cmd.file, &cmd.overrides)?;
    if cmd.strict {
        config.enable_strict();
    }
    config.validate().context("Invalid provisioning config")?;

    println!(
        "{} Loaded cluster: {} ({} nodes)",
        INFO,
        style(&config.name).bold(),
        style(config.nodes.len()).cyan()
    );

    let mut pipeline = config.to_pipeline()?;
    let provider: Arc<dyn NodeProvider> = Arc::new(config.to_inventory());
    // Piped output gets log lines instead of terminal phases
    let mode = StatusMode::select(plain, console::Term::stdout().is_term());
    let terminal: Option<Arc<TerminalStatus>> = mode.terminal().map(Arc::new);
    let status: Arc<dyn StatusReporter> = match &terminal {
        Some(terminal) => terminal.clone(),
        None => Arc::new(LogStatus::new()),
    };
    let ctx = ActionContext::new(&config.name, provider, status);

    // Set up event handler for console output
    let engine = ExecutionEngine::new();
    engine.add_event_handler(move |event| {
        // Spinners already show each action starting and finishing
        let shown_by_spinner = matches!(
            event,
            ExecutionEvent::ActionStarted { .. } | ExecutionEvent::ActionCompleted { .. }
        );
        if mode == StatusMode::Spinner && shown_by_spinner {
            return;
        }
        let line = format_execution_event(&event);
        match &terminal {
            Some(terminal) => terminal.println(&line),
            None => println!("{}", line),
        }
    });

    println!();
    let result = engine.execute(&mut pipeline, &ctx).await;

    println!("\n{}", format_pipeline_summary(&pipeline));

    match result {
        Ok(()) => {
            println!(
                "\n{} {} provisioned {}",
                CHECK,
                style(&pipeline.name).bold(),
                style("successfully").green()
            );
            Ok(())
        }
        Err(e) => {
            println!(
                "\n{} {} {}",
                CROSS,
                style(&pipeline.name).bold(),
                style("failed").red()
            );
            error!("{:#}", anyhow::Error::new(e));
            std::process::exit(1);
        }
    }
}

fn validate_config(cmd: &ValidateCommand) -> Result<()> {
    println!("{} Validating provisioning config...", INFO);

    match ProvisionConfig::from_file(&cmd.file) {
        Ok(config) => {
            println!("{} Provisioning configuration is valid!", CHECK);
            println!("  Cluster: {}", style(&config.name).bold());
            println!("  Nodes: {}", style(config.nodes.len()).cyan());
            println!("  Actions: {}", style(config.actions.len()).cyan());

            if cmd.json {
                let json = serde_json::to_string_pretty(&config)?;
                println!("\n{}", json);
            }
            Ok(())
        }
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(format!("{:#}", e)).red());
            std::process::exit(1);
        }
    }
}

fn render_manifests(cmd: &RenderCommand) -> Result<()> {
    let config = load_config(&cmd.file, &cmd.overrides)?;
    let manifests = config.manifests();

    if manifests.is_empty() {
        println!("{} No create-cluster actions in {}", WARN, cmd.file);
        return Ok(());
    }

    for (name, manifest) in manifests {
        println!("# {}", name);
        println!("{}", manifest);
    }

    Ok(())
}
