//! Volume declaration value object
//!
//! Volumes are written `source:target[:mode]`. Two source prefixes name
//! files the pipeline provides itself: `resource:` for embedded resources
//! and `key:` for files in the DNSSEC key namespace.

use std::fmt;
use std::path::{Path, PathBuf};

const RESOURCE_PREFIX: &str = "resource:";
const KEY_PREFIX: &str = "key:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolumeSource {
    /// Embedded resource, e.g. `resource:configs/bind/recursor.conf`
    Resource(String),
    /// File in the key namespace, e.g. `key:all.ksk.key.bind`
    Key(String),
    /// Host path, absolute or relative to the testbed file
    Path(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeMode {
    ReadOnly,
    ReadWrite,
}

impl VolumeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            VolumeMode::ReadOnly => "ro",
            VolumeMode::ReadWrite => "rw",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeSpec {
    pub source: VolumeSource,
    pub target: String,
    pub mode: Option<VolumeMode>,
}

impl VolumeSpec {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        let (prefix, rest) = if let Some(rest) = raw.strip_prefix(RESOURCE_PREFIX) {
            (Some(RESOURCE_PREFIX), rest)
        } else if let Some(rest) = raw.strip_prefix(KEY_PREFIX) {
            (Some(KEY_PREFIX), rest)
        } else {
            (None, raw)
        };

        let parts: Vec<&str> = rest.split(':').collect();
        let (source, target, mode) = match parts.as_slice() {
            [source, target] => (*source, *target, None),
            [source, target, mode] => {
                let mode = match *mode {
                    "ro" => VolumeMode::ReadOnly,
                    "rw" => VolumeMode::ReadWrite,
                    other => {
                        return Err(format!(
                            "invalid mode '{}' in volume '{}' (expected ro or rw)",
                            other, raw
                        ))
                    }
                };
                (*source, *target, Some(mode))
            }
            _ => {
                return Err(format!(
                    "volume '{}' must have the form source:target[:mode]",
                    raw
                ))
            }
        };

        if source.is_empty() || target.is_empty() {
            return Err(format!("volume '{}' has an empty source or target", raw));
        }

        let source = match prefix {
            Some(RESOURCE_PREFIX) => VolumeSource::Resource(source.trim_start_matches('/').to_string()),
            Some(_) => VolumeSource::Key(source.trim_start_matches('/').to_string()),
            None => VolumeSource::Path(PathBuf::from(source)),
        };

        Ok(Self {
            source,
            target: target.to_string(),
            mode,
        })
    }

    /// File name the source is copied under
    pub fn file_name(&self) -> String {
        let path = match &self.source {
            VolumeSource::Resource(name) | VolumeSource::Key(name) => Path::new(name),
            VolumeSource::Path(path) => path.as_path(),
        };
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "volume".to_string())
    }

    /// Config-file mounts are candidates for the service's main config
    pub fn is_conf(&self) -> bool {
        self.target.ends_with(".conf")
    }

    /// Compose volume string for a host path
    pub fn mount(&self, host: &str) -> String {
        match self.mode {
            Some(mode) => format!("{}:{}:{}", host, self.target, mode.as_str()),
            None => format!("{}:{}", host, self.target),
        }
    }
}

impl fmt::Display for VolumeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match &self.source {
            VolumeSource::Resource(name) => format!("{}{}", RESOURCE_PREFIX, name),
            VolumeSource::Key(name) => format!("{}{}", KEY_PREFIX, name),
            VolumeSource::Path(path) => path.display().to_string(),
        };
        f.write_str(&self.mount(&source))
    }
}
