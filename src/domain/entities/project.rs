//! Project declaration entity
//!
//! The testbed file deserializes into `ProjectConfig`. Service entries stay
//! free-form YAML mappings because they carry arbitrary pass-through keys
//! for the deployment manifest.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml_ng::{Mapping, Value};

use crate::domain::ports::AutomationPhase;
use crate::domain::value_objects::Subnet;
use crate::error::{DnsbError, DnsbResult};

/// Service name -> service config, in declaration order
pub type ServiceMap = IndexMap<String, Mapping>;

/// Top-level testbed declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    pub inet: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ImageConfig>,

    #[serde(default)]
    pub builds: ServiceMap,

    /// Unexpanded include directive; only legal before resolution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Value>,

    #[serde(default, skip_serializing_if = "AutoHooks::is_empty")]
    pub auto: AutoHooks,
}

impl ProjectConfig {
    pub fn subnet(&self) -> DnsbResult<Subnet> {
        self.inet.parse().map_err(|e| {
            DnsbError::NetworkDefinition(format!("invalid subnet '{}': {}", self.inet, e))
        })
    }

    pub fn to_value(&self) -> DnsbResult<Value> {
        Ok(serde_yaml_ng::to_value(self)?)
    }

    pub fn from_value(value: Value) -> DnsbResult<Self> {
        Ok(serde_yaml_ng::from_value(value)?)
    }

    /// Whether any service still declares a parent reference
    pub fn has_unresolved_refs(&self) -> bool {
        self.builds.values().any(|conf| conf.contains_key("ref"))
    }
}

/// Declared image
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageConfig {
    pub name: String,

    /// Another image name, or a `<software>:<version>` preset
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub software: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub util: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependency: Vec<String>,
}

/// Automation scripts for the three extension points
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoHooks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modify: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restrict: Option<String>,
}

impl AutoHooks {
    pub fn is_empty(&self) -> bool {
        self.setup.is_none() && self.modify.is_none() && self.restrict.is_none()
    }

    pub fn hook(&self, phase: AutomationPhase) -> Option<&String> {
        match phase {
            AutomationPhase::Setup => self.setup.as_ref(),
            AutomationPhase::Modify => self.modify.as_ref(),
            AutomationPhase::Restrict => self.restrict.as_ref(),
        }
    }

    /// Hooks declared under a service's `auto` key
    pub fn from_service(service: &str, conf: &Mapping) -> DnsbResult<Self> {
        match conf.get("auto") {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(value) => serde_yaml_ng::from_value(value.clone()).map_err(|e| {
                DnsbError::BuildDefinition(format!(
                    "service '{}' has an invalid 'auto' block: {}",
                    service, e
                ))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROJECT: &str = r#"
name: lab
inet: 10.88.0.0/24
images:
  - name: bind918
    ref: bind:9.18.18
builds:
  root:
    image: bind918
    behavior: ". master @ NS root"
  recursor:
    ref: std:recursor
    image: bind918
auto:
  restrict: "echo pass"
"#;

    #[test]
    fn project_config_preserves_build_order() {
        let project: ProjectConfig = serde_yaml_ng::from_str(PROJECT).unwrap();
        let names: Vec<_> = project.builds.keys().cloned().collect();
        assert_eq!(names, vec!["root", "recursor"]);
        assert_eq!(project.images[0].reference.as_deref(), Some("bind:9.18.18"));
        assert_eq!(project.auto.restrict.as_deref(), Some("echo pass"));
    }

    #[test]
    fn project_config_value_round_trip() {
        let project: ProjectConfig = serde_yaml_ng::from_str(PROJECT).unwrap();
        let value = project.to_value().unwrap();
        let back = ProjectConfig::from_value(value).unwrap();
        assert_eq!(back, project);
    }

    #[test]
    fn project_detects_unresolved_refs() {
        let project: ProjectConfig = serde_yaml_ng::from_str(PROJECT).unwrap();
        assert!(project.has_unresolved_refs());
    }

    #[test]
    fn service_hooks_parse_from_auto_key() {
        let conf: Mapping = serde_yaml_ng::from_str("auto:\n  setup: ./prep.sh\n").unwrap();
        let hooks = AutoHooks::from_service("svc", &conf).unwrap();
        assert_eq!(hooks.setup.as_deref(), Some("./prep.sh"));
        assert!(hooks.modify.is_none());
    }

    #[test]
    fn subnet_errors_are_network_definition_errors() {
        let project = ProjectConfig {
            name: "lab".into(),
            inet: "10.0.0.1/24".into(),
            images: vec![],
            builds: ServiceMap::new(),
            include: None,
            auto: AutoHooks::default(),
        };
        assert!(matches!(
            project.subnet(),
            Err(DnsbError::NetworkDefinition(_))
        ));
    }
}
