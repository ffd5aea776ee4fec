//! Config resolver
//!
//! Flattens every service's config through its `ref` chain and `mixins`.
//! Resolution is depth-first with a memo, so diamond-shaped reference
//! graphs are resolved once, and services currently on the resolution
//! stack are tracked to reject cycles.

use std::collections::HashMap;

use serde_yaml_ng::{Mapping, Value};

use crate::domain::entities::{Image, ServiceMap};
use crate::domain::services::merge::merge_mappings;
use crate::error::{DnsbError, DnsbResult};
use crate::resources::TemplateCatalog;

const STD_PREFIX: &str = "std";

pub struct ConfigResolver<'a> {
    raw: &'a ServiceMap,
    images: &'a HashMap<String, Image>,
    catalog: &'a TemplateCatalog,
    resolved: HashMap<String, Mapping>,
    resolving: Vec<String>,
}

impl<'a> ConfigResolver<'a> {
    pub fn new(
        raw: &'a ServiceMap,
        images: &'a HashMap<String, Image>,
        catalog: &'a TemplateCatalog,
    ) -> Self {
        Self {
            raw,
            images,
            catalog,
            resolved: HashMap::new(),
            resolving: Vec::new(),
        }
    }

    /// Resolve every service, keeping declaration order
    pub fn resolve_all(mut self) -> DnsbResult<ServiceMap> {
        let raw: &'a ServiceMap = self.raw;
        let mut out = ServiceMap::with_capacity(raw.len());
        for name in raw.keys() {
            let flat = self.resolve(name)?;
            out.insert(name.clone(), flat);
        }
        Ok(out)
    }

    /// Resolve one service; repeated calls return the memoized result
    pub fn resolve(&mut self, name: &str) -> DnsbResult<Mapping> {
        if let Some(done) = self.resolved.get(name) {
            return Ok(done.clone());
        }

        let all: &'a ServiceMap = self.raw;
        let raw = all.get(name).ok_or_else(|| {
            DnsbError::ReferenceNotFound(format!("service '{}' is not defined", name))
        })?;

        self.resolving.push(name.to_string());
        let result = self.flatten(name, raw);
        self.resolving.pop();

        let flat = result?;
        self.resolved.insert(name.to_string(), flat.clone());
        Ok(flat)
    }

    /// Number of services resolved so far
    pub fn resolved_count(&self) -> usize {
        self.resolved.len()
    }

    fn flatten(&mut self, name: &str, raw: &Mapping) -> DnsbResult<Mapping> {
        let reference = string_key(name, raw, "ref")?;
        if !raw.contains_key("image") && reference.is_none() && !has_resolution_hooks(raw) {
            return Err(DnsbError::BuildDefinition(format!(
                "service '{}' needs an 'image', a 'ref', or a setup/modify hook",
                name
            )));
        }

        let mut base = match &reference {
            Some(reference) => self.parent_config(name, raw, reference)?,
            None => Mapping::new(),
        };

        for mixin in mixin_keys(name, raw)? {
            let fragment = self.mixin_config(name, raw, &mixin)?;
            base = merge_mappings(&base, &fragment);
        }

        let mut merged = merge_mappings(&base, raw);
        merged.shift_remove("ref");
        merged.shift_remove("mixins");
        Ok(merged)
    }

    fn parent_config(&mut self, name: &str, raw: &Mapping, reference: &str) -> DnsbResult<Mapping> {
        if let Some((prefix, role)) = reference.split_once(':') {
            return self.template(name, raw, prefix, role);
        }

        if self.resolving.iter().any(|s| s == reference) {
            return Err(DnsbError::CircularDependency {
                from: name.to_string(),
                to: reference.to_string(),
            });
        }
        if !self.raw.contains_key(reference) {
            return Err(DnsbError::ReferenceNotFound(format!(
                "service '{}' referenced by '{}' is not defined",
                reference, name
            )));
        }
        self.resolve(reference)
    }

    fn mixin_config(&self, name: &str, raw: &Mapping, key: &str) -> DnsbResult<Mapping> {
        if let Some((prefix, role)) = key.split_once(':') {
            return self.template(name, raw, prefix, role);
        }
        self.catalog.mixin(key).cloned().ok_or_else(|| {
            DnsbError::ReferenceNotFound(format!(
                "unknown mixin '{}' used by service '{}'",
                key, name
            ))
        })
    }

    fn template(&self, name: &str, raw: &Mapping, prefix: &str, role: &str) -> DnsbResult<Mapping> {
        let software = if prefix == STD_PREFIX {
            self.software_of(name, raw)?
        } else {
            prefix.to_string()
        };
        self.catalog
            .template(&software, role)
            .cloned()
            .ok_or_else(|| {
                DnsbError::ReferenceNotFound(format!(
                    "unknown predefined build '{}:{}' used by service '{}'",
                    software, role, name
                ))
            })
    }

    /// Software family behind a `std:` reference, inferred from the image
    fn software_of(&self, name: &str, raw: &Mapping) -> DnsbResult<String> {
        let image_name = string_key(name, raw, "image")?.ok_or_else(|| {
            DnsbError::BuildDefinition(format!(
                "service '{}' uses a 'std:' reference but declares no 'image'",
                name
            ))
        })?;
        let image = self.images.get(&image_name).ok_or_else(|| {
            DnsbError::ReferenceNotFound(format!(
                "image '{}' used by service '{}' is not defined",
                image_name, name
            ))
        })?;
        image.software.clone().ok_or_else(|| {
            DnsbError::BuildDefinition(format!(
                "image '{}' has no software family, so service '{}' cannot use a 'std:' reference",
                image_name, name
            ))
        })
    }
}

fn string_key(service: &str, conf: &Mapping, key: &str) -> DnsbResult<Option<String>> {
    match conf.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(DnsbError::BuildDefinition(format!(
            "'{}' of service '{}' must be a string",
            key, service
        ))),
    }
}

fn mixin_keys(service: &str, conf: &Mapping) -> DnsbResult<Vec<String>> {
    match conf.get("mixins") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(s)) => Ok(vec![s.clone()]),
        Some(Value::Sequence(items)) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    DnsbError::BuildDefinition(format!(
                        "mixins of service '{}' must be strings",
                        service
                    ))
                })
            })
            .collect(),
        Some(_) => Err(DnsbError::BuildDefinition(format!(
            "'mixins' of service '{}' must be a list",
            service
        ))),
    }
}

fn has_resolution_hooks(conf: &Mapping) -> bool {
    conf.get("auto")
        .and_then(Value::as_mapping)
        .map(|auto| auto.contains_key("setup") || auto.contains_key("modify"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests;
