//! Commands executed on a node and their outcome

use crate::node::NodeHandle;
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

/// Error types for node command execution
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("command \"{command}\" on node {node} exited with code {code}: {}", .stderr.trim())]
    NonZeroExit {
        node: String,
        command: String,
        code: i32,
        stdout: String,
        stderr: String,
    },

    #[error("failed to run \"{command}\" on node {node}: {source}")]
    Transport {
        node: String,
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("command \"{command}\" on node {node} timed out after {secs} seconds")]
    Timeout {
        node: String,
        command: String,
        secs: u64,
    },
}

/// A command to run on a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program name, resolved on the node
    pub program: String,

    /// Arguments passed to the program
    pub args: Vec<String>,

    /// Text piped to the program's stdin
    pub stdin: Option<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
            stdin: None,
        }
    }

    /// Program followed by its arguments
    pub fn argv(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.args.len() + 1);
        argv.push(self.program.clone());
        argv.extend(self.args.iter().cloned());
        argv
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.argv().join(" "))
    }
}

/// Captured outcome of a command, whatever its exit status
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code (None when terminated by a signal)
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// A command bound to the node it will run on
pub struct NodeCommand<'a> {
    node: &'a dyn NodeHandle,
    spec: CommandSpec,
}

impl<'a> NodeCommand<'a> {
    pub fn new(node: &'a dyn NodeHandle, spec: CommandSpec) -> Self {
        Self { node, spec }
    }

    /// Pipe `input` into the command's stdin
    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.spec.stdin = Some(input.into());
        self
    }

    pub fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    /// Run the command, failing with `ExecError::NonZeroExit` unless it exits zero
    pub async fn run(self) -> Result<CommandOutput, ExecError> {
        debug!(node = %self.node.name(), command = %self.spec, "Running command");

        let output = self.node.run(&self.spec).await?;
        if output.success() {
            return Ok(output);
        }

        let code = output.code.unwrap_or(-1);
        warn!(
            node = %self.node.name(),
            command = %self.spec,
            "Command exited with code {}",
            code
        );
        Err(ExecError::NonZeroExit {
            node: self.node.name().to_string(),
            command: self.spec.to_string(),
            code,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    /// Run the command and split its stdout into lines
    pub async fn output_lines(self) -> Result<Vec<String>, ExecError> {
        let output = self.run().await?;
        Ok(output.stdout.lines().map(str::to_string).collect())
    }
}
