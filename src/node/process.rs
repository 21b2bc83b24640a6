//! Node handle backed by a local subprocess

use crate::node::{CommandOutput, CommandSpec, ExecError, NodeHandle, NodeRole};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

/// A node reached by spawning a local process
///
/// Every command is prefixed with the node's transport, e.g.
/// `docker exec -i <container>` or `ssh <host>`; an empty prefix runs the
/// command on the local machine.
#[derive(Debug, Clone)]
pub struct ProcessNode {
    name: String,
    role: NodeRole,
    prefix: Vec<String>,
    timeout_secs: Option<u64>,
}

impl ProcessNode {
    /// Node that is the local machine
    pub fn local(name: impl Into<String>, role: NodeRole) -> Self {
        Self {
            name: name.into(),
            role,
            prefix: Vec::new(),
            timeout_secs: None,
        }
    }

    /// Node running as a container on the local docker daemon
    pub fn docker(name: impl Into<String>, container: impl Into<String>, role: NodeRole) -> Self {
        Self::local(name, role).with_prefix(vec![
            "docker".to_string(),
            "exec".to_string(),
            "-i".to_string(),
            container.into(),
        ])
    }

    /// Node reached over ssh
    pub fn ssh(name: impl Into<String>, destination: impl Into<String>, role: NodeRole) -> Self {
        Self::local(name, role).with_prefix(vec!["ssh".to_string(), destination.into()])
    }

    pub fn with_prefix(mut self, prefix: Vec<String>) -> Self {
        self.prefix = prefix;
        self
    }

    /// Fail commands that run longer than `timeout_secs`
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    pub fn prefix(&self) -> &[String] {
        &self.prefix
    }

    /// Full argv spawned for `command`
    pub fn argv(&self, command: &CommandSpec) -> Vec<String> {
        let mut argv = self.prefix.clone();
        argv.extend(command.argv());
        argv
    }

    async fn spawn(&self, command: &CommandSpec) -> std::io::Result<std::process::Output> {
        let argv = self.argv(command);
        let (program, args) = argv.split_first().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command line")
        })?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(if command.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        // Feed stdin while output is drained so neither pipe can fill up
        let stdin = child.stdin.take();
        let feed = async move {
            let (Some(input), Some(mut stdin)) = (&command.stdin, stdin) else {
                return Ok(());
            };
            match stdin.write_all(input.as_bytes()).await {
                // The command exited without reading all of its input; its
                // exit status is what gets reported
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                    debug!("Node {} closed stdin early", self.name);
                    Ok(())
                }
                other => other,
            }
            // Dropping stdin closes the pipe so the command sees EOF
        };

        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output?;
        fed?;
        Ok(output)
    }
}

#[async_trait]
impl NodeHandle for ProcessNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn role(&self) -> NodeRole {
        self.role
    }

    async fn run(&self, command: &CommandSpec) -> Result<CommandOutput, ExecError> {
        debug!("Spawning {:?} for node {}", self.argv(command), self.name);

        let result = match self.timeout_secs {
            Some(secs) => timeout(Duration::from_secs(secs), self.spawn(command))
                .await
                .map_err(|_| ExecError::Timeout {
                    node: self.name.clone(),
                    command: command.to_string(),
                    secs,
                })?,
            None => self.spawn(command).await,
        };

        let output = result.map_err(|source| ExecError::Transport {
            node: self.name.clone(),
            command: command.to_string(),
            source,
        })?;

        debug!(
            "Command on node {} exited with {:?} ({} bytes of output)",
            self.name,
            output.status.code(),
            output.stdout.len()
        );

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
