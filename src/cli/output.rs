//! CLI output formatting

use crate::{
    core::{ActionState, ExecutionStatus, Pipeline},
    execution::ExecutionEvent,
};
use console::Emoji;
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "! ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Format an action state for display
pub fn format_action_state(state: &ActionState) -> String {
    match state {
        ActionState::Pending => style("PENDING").dim().to_string(),
        ActionState::Running { .. } => style("RUNNING").yellow().to_string(),
        ActionState::Completed { .. } => style("COMPLETED").green().to_string(),
        ActionState::Failed { .. } => style("FAILED").red().to_string(),
        ActionState::Skipped { .. } => style("SKIPPED").dim().to_string(),
    }
}

/// Format an execution status for display
pub fn format_status(status: ExecutionStatus) -> String {
    match status {
        ExecutionStatus::Pending => style("PENDING").dim().to_string(),
        ExecutionStatus::Running => style("RUNNING").yellow().to_string(),
        ExecutionStatus::Completed => style("COMPLETED").green().to_string(),
        ExecutionStatus::Failed => style("FAILED").red().to_string(),
    }
}

/// Overall status and progress, then one line per action with its final state
pub fn format_pipeline_summary(pipeline: &Pipeline) -> String {
    let mut lines = vec![format!(
        "{} {} ({})",
        style(&pipeline.name).bold(),
        format_status(pipeline.state.status),
        style(format!("{:.0}%", pipeline.state.progress() * 100.0)).cyan()
    )];

    lines.extend(
        pipeline
            .action_names()
            .iter()
            .zip(pipeline.action_states())
            .enumerate()
            .map(|(i, (name, state))| {
                format!(
                    "  [{}/{}] {} {}",
                    i + 1,
                    pipeline.len(),
                    style(name).bold(),
                    format_action_state(state)
                )
            }),
    );
    lines.join("\n")
}

/// Format an execution event for display
pub fn format_execution_event(event: &ExecutionEvent) -> String {
    match event {
        ExecutionEvent::PipelineStarted {
            execution_id,
            pipeline_name,
            total_actions,
        } => format!(
            "{} Provisioning {} with {} action(s) ({})",
            ROCKET,
            style(pipeline_name).bold(),
            style(total_actions).cyan(),
            style(&execution_id.to_string()[..8]).dim()
        ),
        ExecutionEvent::ActionStarted { index, action } => {
            format!("{} [{}] {}", SPINNER, index + 1, style(action).cyan())
        }
        ExecutionEvent::ActionCompleted {
            index,
            action,
            elapsed,
        } => format!(
            "{} [{}] {} {}",
            CHECK,
            index + 1,
            style(action).green(),
            style(format_duration(*elapsed)).dim()
        ),
        ExecutionEvent::ActionFailed {
            index,
            action,
            error,
        } => format!(
            "{} [{}] {}: {}",
            CROSS,
            index + 1,
            style(action).red(),
            style(error).dim()
        ),
        ExecutionEvent::ActionSkipped { index, action } => {
            format!("{} [{}] {} skipped", WARN, index + 1, style(action).dim())
        }
        ExecutionEvent::PipelineCompleted {
            execution_id,
            status,
        } => {
            let status_str = match status {
                ExecutionStatus::Completed => format!("{} completed", style("successfully").green()),
                ExecutionStatus::Failed => style("failed").red().to_string(),
                _ => format!("{:?}", status),
            };
            format!(
                "{} Pipeline ({}) {}",
                INFO,
                style(&execution_id.to_string()[..8]).dim(),
                status_str
            )
        }
    }
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{}.{}s", secs, duration.subsec_millis() / 100)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
