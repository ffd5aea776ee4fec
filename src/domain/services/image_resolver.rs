//! Image resolver
//!
//! Turns image declarations into `Image`s. An image may reference a
//! `<software>:<version>` preset or another declared image; fields set on
//! the image itself win, package lists are unioned.

use std::collections::HashMap;

use crate::domain::entities::{Image, ImageConfig};
use crate::domain::value_objects::SoftwareFamily;
use crate::error::{DnsbError, DnsbResult};

pub const DEFAULT_BASE_IMAGE: &str = "ubuntu:22.04";

pub fn resolve_images(configs: &[ImageConfig]) -> DnsbResult<HashMap<String, Image>> {
    let mut declared: HashMap<&str, &ImageConfig> = HashMap::new();
    for config in configs {
        if config.name.trim().is_empty() {
            return Err(DnsbError::ImageDefinition("image without a name".to_string()));
        }
        if config.name.contains(':') {
            return Err(DnsbError::ImageDefinition(format!(
                "image name '{}' must not contain ':'",
                config.name
            )));
        }
        if declared.insert(config.name.as_str(), config).is_some() {
            return Err(DnsbError::ImageDefinition(format!(
                "image '{}' is declared twice",
                config.name
            )));
        }
    }

    let mut resolver = ImageResolver {
        declared,
        flattened: HashMap::new(),
        stack: Vec::new(),
    };
    let mut images = HashMap::new();
    for config in configs {
        let flat = resolver.flatten(&config.name)?;
        images.insert(config.name.clone(), finalize(flat)?);
    }
    Ok(images)
}

struct ImageResolver<'a> {
    declared: HashMap<&'a str, &'a ImageConfig>,
    flattened: HashMap<String, ImageConfig>,
    stack: Vec<String>,
}

impl ImageResolver<'_> {
    fn flatten(&mut self, name: &str) -> DnsbResult<ImageConfig> {
        if let Some(done) = self.flattened.get(name) {
            return Ok(done.clone());
        }
        let config = *self.declared.get(name).ok_or_else(|| {
            DnsbError::ReferenceNotFound(format!("image '{}' is not defined", name))
        })?;

        self.stack.push(name.to_string());
        let parent = match config.reference.as_deref() {
            None => Ok(None),
            Some(reference) => self.parent(name, reference).map(Some),
        };
        self.stack.pop();

        let flat = match parent? {
            Some(parent) => overlay(parent, config),
            None => config.clone(),
        };
        self.flattened.insert(name.to_string(), flat.clone());
        Ok(flat)
    }

    fn parent(&mut self, name: &str, reference: &str) -> DnsbResult<ImageConfig> {
        if let Some((software, version)) = reference.split_once(':') {
            return preset(name, software, version);
        }
        if self.stack.iter().any(|s| s == reference) {
            return Err(DnsbError::CircularDependency {
                from: name.to_string(),
                to: reference.to_string(),
            });
        }
        self.flatten(reference)
    }
}

fn preset(name: &str, software: &str, version: &str) -> DnsbResult<ImageConfig> {
    if let SoftwareFamily::Other(other) = SoftwareFamily::from_software(software) {
        return Err(DnsbError::ImageDefinition(format!(
            "image '{}' references unknown preset software '{}'",
            name, other
        )));
    }
    if version.trim().is_empty() {
        return Err(DnsbError::ImageDefinition(format!(
            "image '{}' references preset '{}' without a version",
            name, software
        )));
    }
    Ok(ImageConfig {
        name: format!("{}:{}", software, version),
        software: Some(software.to_string()),
        version: Some(version.to_string()),
        ..ImageConfig::default()
    })
}

fn overlay(parent: ImageConfig, child: &ImageConfig) -> ImageConfig {
    let mut util = parent.util;
    for item in &child.util {
        if !util.contains(item) {
            util.push(item.clone());
        }
    }
    let mut dependency = parent.dependency;
    for item in &child.dependency {
        if !dependency.contains(item) {
            dependency.push(item.clone());
        }
    }
    ImageConfig {
        name: child.name.clone(),
        reference: None,
        software: child.software.clone().or(parent.software),
        version: child.version.clone().or(parent.version),
        from: child.from.clone().or(parent.from),
        util,
        dependency,
    }
}

fn finalize(flat: ImageConfig) -> DnsbResult<Image> {
    let mut packages = flat.dependency;
    for item in flat.util {
        if !packages.contains(&item) {
            packages.push(item);
        }
    }

    match (flat.software, flat.version, flat.from) {
        (Some(software), Some(version), from) => Ok(Image {
            name: flat.name,
            software: Some(software),
            version: Some(version),
            from: from.unwrap_or_else(|| DEFAULT_BASE_IMAGE.to_string()),
            packages,
        }),
        (Some(software), None, _) => Err(DnsbError::ImageDefinition(format!(
            "image '{}' declares software '{}' without a version",
            flat.name, software
        ))),
        (None, _, Some(from)) => Ok(Image {
            name: flat.name,
            software: None,
            version: None,
            from,
            packages,
        }),
        (None, _, None) => Err(DnsbError::ImageDefinition(format!(
            "image '{}' needs a software/version pair or a 'from' image",
            flat.name
        ))),
    }
}
