//! Automation port
//!
//! User automation scripts are a black box hooked into three extension
//! points. Setup and modify may replace the tree they are given; restrict
//! returns a textual verdict.

use std::fmt;

use serde_yaml_ng::Value;
use thiserror::Error;

/// Verdict a restrict hook must return for the build to continue
pub const PASS_VERDICT: &str = "pass";

/// Extension point a hook belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AutomationPhase {
    Setup,
    Modify,
    Restrict,
}

impl AutomationPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            AutomationPhase::Setup => "setup",
            AutomationPhase::Modify => "modify",
            AutomationPhase::Restrict => "restrict",
        }
    }
}

impl fmt::Display for AutomationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum AutomationError {
    #[error("{phase} hook for '{scope}' could not be started: {message}")]
    Spawn {
        phase: AutomationPhase,
        scope: String,
        message: String,
    },

    #[error("{phase} hook for '{scope}' failed: {message}")]
    Failed {
        phase: AutomationPhase,
        scope: String,
        message: String,
    },

    #[error("{phase} hook for '{scope}' returned an invalid tree: {message}")]
    InvalidOutput {
        phase: AutomationPhase,
        scope: String,
        message: String,
    },
}

/// Runs automation scripts
///
/// `scope` names what the tree belongs to: `global` or a service name.
pub trait Automation: Send + Sync {
    /// Run a setup or modify script; returns the (possibly replaced) tree
    fn transform(
        &self,
        phase: AutomationPhase,
        scope: &str,
        script: &str,
        tree: &Value,
    ) -> Result<Value, AutomationError>;

    /// Run a restrict script; returns its verdict
    fn verdict(&self, scope: &str, script: &str, tree: &Value) -> Result<String, AutomationError>;
}
