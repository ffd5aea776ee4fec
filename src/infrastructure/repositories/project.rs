//! YAML Project Repository
//!
//! Implements the ProjectRepository port on top of the Storage capability.
//! `include` entries name further YAML files, relative to the including
//! file, that contribute `images` and `builds`. Declarations already present
//! win over included ones, so the main file always has the final say.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_yaml_ng::Value;
use tracing::debug;

use crate::domain::entities::{ImageConfig, ProjectConfig, ServiceMap};
use crate::domain::ports::{ProjectRepository, Storage};
use crate::domain::value_objects::ConfigWarning;
use crate::error::{DnsbError, DnsbResult};

/// Keys a testbed file may legitimately contain, used for suggestions
const KNOWN_KEYS: &[&str] = &[
    "name",
    "inet",
    "images",
    "builds",
    "include",
    "auto",
    "ref",
    "software",
    "version",
    "from",
    "util",
    "dependency",
    "setup",
    "modify",
    "restrict",
];

/// Contents an included file may contribute
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Fragment {
    images: Vec<ImageConfig>,
    builds: ServiceMap,
    include: Option<Value>,
}

pub struct YamlProjectRepository {
    storage: Arc<dyn Storage>,
}

impl YamlProjectRepository {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    fn parse<T: DeserializeOwned>(&self, path: &Path) -> DnsbResult<(T, Vec<ConfigWarning>)> {
        let content = self.storage.read_text(path)?;

        let mut unknown_paths: Vec<String> = Vec::new();
        let deserializer = serde_yaml_ng::Deserializer::from_str(&content);
        let parsed: T = serde_ignored::deserialize(deserializer, |p| {
            unknown_paths.push(p.to_string());
        })
        .map_err(|e| DnsbError::Config {
            file: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let warnings = unknown_paths
            .iter()
            .map(|p| ConfigWarning::unknown_key(p, path, &content, KNOWN_KEYS))
            .collect();
        Ok((parsed, warnings))
    }

    fn expand(
        &self,
        file: &Path,
        include: Option<Value>,
        project: &mut ProjectConfig,
        stack: &mut Vec<PathBuf>,
        warnings: &mut Vec<ConfigWarning>,
    ) -> DnsbResult<()> {
        let base = file.parent().unwrap_or_else(|| Path::new(""));
        for relative in include_paths(file, include)? {
            let path = base.join(&relative);
            if stack.contains(&path) {
                return Err(DnsbError::Config {
                    file: file.to_path_buf(),
                    message: format!("include cycle through '{}'", path.display()),
                });
            }

            let (fragment, found): (Fragment, _) = self.parse(&path)?;
            warnings.extend(found);
            merge_fragment(project, fragment.images, fragment.builds, &path);

            stack.push(path.clone());
            let nested = self.expand(&path, fragment.include, project, stack, warnings);
            stack.pop();
            nested?;
        }
        Ok(())
    }
}

impl ProjectRepository for YamlProjectRepository {
    fn load_with_warnings(&self, path: &Path) -> DnsbResult<(ProjectConfig, Vec<ConfigWarning>)> {
        let (mut project, mut warnings): (ProjectConfig, _) = self.parse(path)?;

        let include = project.include.take();
        let mut stack = vec![path.to_path_buf()];
        self.expand(path, include, &mut project, &mut stack, &mut warnings)?;

        validate(path, &project)?;
        debug!(
            file = %path.display(),
            services = project.builds.len(),
            images = project.images.len(),
            "project loaded"
        );
        Ok((project, warnings))
    }
}

fn include_paths(file: &Path, include: Option<Value>) -> DnsbResult<Vec<String>> {
    let invalid = || DnsbError::Config {
        file: file.to_path_buf(),
        message: "'include' must be a path or a list of paths".to_string(),
    };
    match include {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(path)) => Ok(vec![path]),
        Some(Value::Sequence(items)) => items
            .into_iter()
            .map(|item| match item {
                Value::String(path) => Ok(path),
                _ => Err(invalid()),
            })
            .collect(),
        Some(_) => Err(invalid()),
    }
}

fn merge_fragment(project: &mut ProjectConfig, images: Vec<ImageConfig>, builds: ServiceMap, from: &Path) {
    for image in images {
        if project.images.iter().any(|i| i.name == image.name) {
            debug!(image = %image.name, file = %from.display(), "included image shadowed");
            continue;
        }
        project.images.push(image);
    }
    for (name, conf) in builds {
        if project.builds.contains_key(&name) {
            debug!(service = %name, file = %from.display(), "included service shadowed");
            continue;
        }
        project.builds.insert(name, conf);
    }
}

fn validate(path: &Path, project: &ProjectConfig) -> DnsbResult<()> {
    if project.name.trim().is_empty() {
        return Err(DnsbError::Config {
            file: path.to_path_buf(),
            message: "'name' must not be empty".to_string(),
        });
    }
    project.subnet().map_err(|e| DnsbError::Config {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(())
}
