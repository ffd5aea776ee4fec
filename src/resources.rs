//! Embedded resources
//!
//! Role templates, mixins and the config files they mount ship inside the
//! binary. Volume sources written `resource:<path>` are looked up here.

use std::collections::HashMap;

use serde::Deserialize;
use serde_yaml_ng::Mapping;

use crate::error::DnsbResult;

const TEMPLATES: &str = include_str!("../resources/templates.yml");

const RESOURCES: &[(&str, &str)] = &[
    (
        "configs/bind/recursor.conf",
        include_str!("../resources/configs/bind/recursor.conf"),
    ),
    (
        "configs/bind/authoritative.conf",
        include_str!("../resources/configs/bind/authoritative.conf"),
    ),
    (
        "configs/bind/forwarder.conf",
        include_str!("../resources/configs/bind/forwarder.conf"),
    ),
    (
        "configs/unbound/recursor.conf",
        include_str!("../resources/configs/unbound/recursor.conf"),
    ),
    (
        "configs/unbound/forwarder.conf",
        include_str!("../resources/configs/unbound/forwarder.conf"),
    ),
    (
        "configs/unbound/authoritative.conf",
        include_str!("../resources/configs/unbound/authoritative.conf"),
    ),
];

/// Content of an embedded resource file
pub fn embedded(path: &str) -> Option<&'static str> {
    let path = path.trim_start_matches('/');
    RESOURCES
        .iter()
        .find(|(name, _)| *name == path)
        .map(|(_, content)| *content)
}

/// Predefined role templates and mixins
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplateCatalog {
    #[serde(default)]
    builds: HashMap<String, HashMap<String, Mapping>>,
    #[serde(default)]
    mixins: HashMap<String, Mapping>,
}

impl TemplateCatalog {
    /// The catalog compiled into the binary
    pub fn builtin() -> DnsbResult<Self> {
        Self::from_yaml(TEMPLATES)
    }

    pub fn from_yaml(text: &str) -> DnsbResult<Self> {
        Ok(serde_yaml_ng::from_str(text)?)
    }

    /// Template for `<software>:<role>`
    pub fn template(&self, software: &str, role: &str) -> Option<&Mapping> {
        self.builds
            .get(&software.to_ascii_lowercase())
            .and_then(|roles| roles.get(role))
    }

    pub fn mixin(&self, name: &str) -> Option<&Mapping> {
        self.mixins.get(name)
    }
}
