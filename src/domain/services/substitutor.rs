//! Variable substitution
//!
//! Replaces `${...}` placeholders in string leaves of the resolved tree.
//! The innermost placeholder is replaced first and passes repeat until the
//! text stops changing, so `${services.${name}.ip}`-style nesting works.
//!
//! Recognized keys:
//! - `env.NAME[:default]`
//! - `services.<svc>.ip` / `.address`, `services.<svc>.image.<attr>`, `services.<svc>.<path>`
//! - `name`, `ip`, `address`, `project.name`, `project.inet`
//! - `image.name`, `image.software`, `image.version`
//! - any dotted path into the service's own config
//!
//! A `:fallback` suffix is used when a non-env key resolves to nothing.
//! Unknown placeholders stay verbatim.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::{Arc, LazyLock};

use indexmap::IndexMap;
use regex::Regex;
use serde_yaml_ng::{Mapping, Value};
use tracing::warn;

use crate::domain::entities::{Image, ProjectConfig, ServiceMap};
use crate::error::{DnsbError, DnsbResult};

pub const MAX_PASSES: usize = 5;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^{}]+)\}").expect("placeholder pattern is valid"));

type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Whose variables a string is substituted with
#[derive(Debug, Clone, Copy)]
pub enum Scope<'s> {
    Project,
    Service { name: &'s str, config: &'s Mapping },
}

pub struct VariableSubstitutor<'a> {
    project_name: &'a str,
    project_inet: &'a str,
    services: &'a ServiceMap,
    addresses: &'a IndexMap<String, Ipv4Addr>,
    images: &'a HashMap<String, Image>,
    env: EnvLookup,
}

impl<'a> VariableSubstitutor<'a> {
    pub fn new(
        project: &'a ProjectConfig,
        services: &'a ServiceMap,
        addresses: &'a IndexMap<String, Ipv4Addr>,
        images: &'a HashMap<String, Image>,
    ) -> Self {
        Self {
            project_name: &project.name,
            project_inet: &project.inet,
            services,
            addresses,
            images,
            env: Arc::new(|name| std::env::var(name).ok()),
        }
    }

    /// Replace the environment lookup
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        self.env = Arc::new(lookup);
        self
    }

    /// Substitute every service config with its own scope
    pub fn substitute_services(&self) -> DnsbResult<ServiceMap> {
        let mut out = ServiceMap::with_capacity(self.services.len());
        for (name, config) in self.services {
            let scope = Scope::Service {
                name: name.as_str(),
                config,
            };
            let substituted = self.substitute_mapping(config, scope)?;
            out.insert(name.clone(), substituted);
        }
        Ok(out)
    }

    /// Substitute the whole project: top-level keys with the project scope,
    /// builds with per-service scopes
    pub fn substitute_project(&self, project: &ProjectConfig) -> DnsbResult<ProjectConfig> {
        let builds = self.substitute_services()?;
        let mut top = match project.to_value()? {
            Value::Mapping(top) => top,
            _ => Mapping::new(),
        };
        top.shift_remove("builds");
        let top = self.substitute_mapping(&top, Scope::Project)?;
        let mut substituted = ProjectConfig::from_value(Value::Mapping(top))?;
        substituted.builds = builds;
        Ok(substituted)
    }

    pub fn substitute_mapping(&self, mapping: &Mapping, scope: Scope<'_>) -> DnsbResult<Mapping> {
        let mut out = Mapping::with_capacity(mapping.len());
        for (key, value) in mapping {
            out.insert(key.clone(), self.substitute_value(value, scope)?);
        }
        Ok(out)
    }

    pub fn substitute_value(&self, value: &Value, scope: Scope<'_>) -> DnsbResult<Value> {
        Ok(match value {
            Value::String(s) => Value::String(self.substitute_str(s, scope)?),
            Value::Sequence(items) => Value::Sequence(
                items
                    .iter()
                    .map(|item| self.substitute_value(item, scope))
                    .collect::<DnsbResult<_>>()?,
            ),
            Value::Mapping(mapping) => Value::Mapping(self.substitute_mapping(mapping, scope)?),
            other => other.clone(),
        })
    }

    pub fn substitute_str(&self, text: &str, scope: Scope<'_>) -> DnsbResult<String> {
        if !text.contains("${") {
            return Ok(text.to_string());
        }

        let mut current = text.to_string();
        for _ in 0..MAX_PASSES {
            let (next, unresolved) = self.pass(&current, scope)?;
            if next == current {
                for key in unresolved {
                    warn!(placeholder = %key, text = %text, "unresolved variable left as-is");
                }
                return Ok(next);
            }
            current = next;
        }

        warn!(
            text = %text,
            passes = MAX_PASSES,
            "placeholders still changing after the pass limit; possible circular reference"
        );
        Ok(current)
    }

    fn pass(&self, text: &str, scope: Scope<'_>) -> DnsbResult<(String, Vec<String>)> {
        let mut out = String::with_capacity(text.len());
        let mut unresolved = Vec::new();
        let mut last = 0;

        for caps in PLACEHOLDER.captures_iter(text) {
            let (Some(whole), Some(key)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            out.push_str(&text[last..whole.start()]);
            match self.lookup(key.as_str().trim(), scope)? {
                Some(value) => out.push_str(&value),
                None => {
                    unresolved.push(key.as_str().to_string());
                    out.push_str(whole.as_str());
                }
            }
            last = whole.end();
        }
        out.push_str(&text[last..]);
        Ok((out, unresolved))
    }

    fn lookup(&self, key: &str, scope: Scope<'_>) -> DnsbResult<Option<String>> {
        if let Some(spec) = key.strip_prefix("env.") {
            return self.lookup_env(spec).map(Some);
        }

        let (path, fallback) = match key.split_once(':') {
            Some((path, fallback)) => (path, Some(fallback.to_string())),
            None => (key, None),
        };

        let found = match path.strip_prefix("services.") {
            Some(rest) => match self.lookup_service(rest) {
                Ok(found) => found,
                Err(_) if fallback.is_some() => None,
                Err(e) => return Err(e),
            },
            None => self.lookup_scope(path, scope),
        };
        Ok(found.or(fallback))
    }

    fn lookup_env(&self, spec: &str) -> DnsbResult<String> {
        let (name, default) = match spec.split_once(':') {
            Some((name, default)) => (name, Some(default)),
            None => (spec, None),
        };
        match ((self.env)(name), default) {
            (Some(value), _) => Ok(value),
            (None, Some(default)) => Ok(default.to_string()),
            (None, None) => Err(DnsbError::Build(format!(
                "environment variable '{}' is not set and has no default",
                name
            ))),
        }
    }

    fn lookup_service(&self, rest: &str) -> DnsbResult<Option<String>> {
        let (service, attr) = rest.split_once('.').unwrap_or((rest, "ip"));

        if attr == "ip" || attr == "address" {
            if let Some(addr) = self.addresses.get(service) {
                return Ok(Some(addr.to_string()));
            }
            return Err(if self.services.contains_key(service) {
                DnsbError::ReferenceNotFound(format!(
                    "cannot resolve IP for service '{}': the service is defined but is not buildable",
                    service
                ))
            } else {
                DnsbError::ReferenceNotFound(format!(
                    "cannot resolve IP for service '{}': service not found in builds",
                    service
                ))
            });
        }

        let Some(config) = self.services.get(service) else {
            return Ok(None);
        };
        if let Some(image_attr) = attr.strip_prefix("image.") {
            return Ok(self.image_attr(config, image_attr));
        }
        Ok(config_path(config, attr))
    }

    fn lookup_scope(&self, path: &str, scope: Scope<'_>) -> Option<String> {
        match path {
            "project.name" => return Some(self.project_name.to_string()),
            "project.inet" => return Some(self.project_inet.to_string()),
            _ => {}
        }

        let Scope::Service { name, config } = scope else {
            return None;
        };
        match path {
            "name" => Some(name.to_string()),
            "ip" | "address" => self.addresses.get(name).map(ToString::to_string),
            _ => match path.strip_prefix("image.") {
                Some(attr) => self.image_attr(config, attr),
                None => config_path(config, path),
            },
        }
    }

    fn image_attr(&self, config: &Mapping, attr: &str) -> Option<String> {
        let image_name = config.get("image")?.as_str()?;
        let image = self.images.get(image_name)?;
        match attr {
            "name" => Some(image.name.clone()),
            "software" => image.software.clone(),
            "version" => image.version.clone(),
            _ => None,
        }
    }
}

/// Scalar at a dotted path inside a config
fn config_path(config: &Mapping, path: &str) -> Option<String> {
    let mut parts = path.split('.');
    let mut current = config.get(parts.next()?)?;
    for part in parts {
        current = current.as_mapping()?.get(part)?;
    }
    match current {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests;
