use serde_yaml_ng::Value;

use crate::domain::ports::{Automation, AutomationError, AutomationPhase, PASS_VERDICT};

/// Automation that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAutomation;

impl Automation for NoopAutomation {
    fn transform(
        &self,
        _phase: AutomationPhase,
        _scope: &str,
        _script: &str,
        tree: &Value,
    ) -> Result<Value, AutomationError> {
        Ok(tree.clone())
    }

    fn verdict(&self, _scope: &str, _script: &str, _tree: &Value) -> Result<String, AutomationError> {
        Ok(PASS_VERDICT.to_string())
    }
}
