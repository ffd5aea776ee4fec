//! Shell automation adapter
//!
//! Each hook is run as `sh -c <script>` with the scope's tree as YAML on
//! stdin. Setup and modify hooks may print a replacement tree; restrict
//! hooks print a verdict.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use serde_yaml_ng::Value;
use tracing::debug;

use crate::domain::ports::{Automation, AutomationError, AutomationPhase};

#[derive(Debug, Clone)]
pub struct ShellAutomation {
    shell: PathBuf,
    workdir: Option<PathBuf>,
}

impl Default for ShellAutomation {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellAutomation {
    pub fn new() -> Self {
        Self {
            shell: PathBuf::from("sh"),
            workdir: None,
        }
    }

    /// Run scripts from this directory (normally the testbed file's)
    pub fn with_workdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(dir.into());
        self
    }

    fn run(
        &self,
        phase: AutomationPhase,
        scope: &str,
        script: &str,
        tree: &Value,
    ) -> Result<String, AutomationError> {
        let input = serde_yaml_ng::to_string(tree).map_err(|e| AutomationError::Spawn {
            phase,
            scope: scope.to_string(),
            message: format!("cannot serialize tree: {}", e),
        })?;

        let mut command = Command::new(&self.shell);
        command
            .arg("-c")
            .arg(script)
            .env("DNSB_HOOK", phase.as_str())
            .env("DNSB_SCOPE", scope)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.workdir {
            command.current_dir(dir);
        }

        let spawn_error = |e: std::io::Error| AutomationError::Spawn {
            phase,
            scope: scope.to_string(),
            message: e.to_string(),
        };
        let mut child = command.spawn().map_err(spawn_error)?;
        if let Some(mut stdin) = child.stdin.take() {
            // A script that never reads stdin closes the pipe early.
            if let Err(e) = stdin.write_all(input.as_bytes()) {
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(spawn_error(e));
                }
            }
        }
        let output = child.wait_with_output().map_err(spawn_error)?;

        if !output.status.success() {
            return Err(AutomationError::Failed {
                phase,
                scope: scope.to_string(),
                message: format!(
                    "exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        debug!(phase = %phase, scope, "hook finished");
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Automation for ShellAutomation {
    fn transform(
        &self,
        phase: AutomationPhase,
        scope: &str,
        script: &str,
        tree: &Value,
    ) -> Result<Value, AutomationError> {
        let stdout = self.run(phase, scope, script, tree)?;
        if stdout.trim().is_empty() {
            return Ok(tree.clone());
        }
        serde_yaml_ng::from_str(&stdout).map_err(|e| AutomationError::InvalidOutput {
            phase,
            scope: scope.to_string(),
            message: e.to_string(),
        })
    }

    fn verdict(&self, scope: &str, script: &str, tree: &Value) -> Result<String, AutomationError> {
        let stdout = self.run(AutomationPhase::Restrict, scope, script, tree)?;
        Ok(stdout.trim().to_string())
    }
}
