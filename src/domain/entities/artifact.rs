//! Generated artifacts
//!
//! Behaviors and zones produce files that end up mounted into a service's
//! container, plus config lines appended to its main config.

use crate::domain::entities::ResourceRecord;

/// Where a config line belongs in the generated include file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigSection {
    #[default]
    TopLevel,
    /// Inside a `server:` block (Unbound)
    Server,
}

/// A file generated for a container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub name: String,
    pub content: String,
    pub container_path: String,
}

/// Output of rendering one behavior statement
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BehaviorArtifact {
    pub config_line: Option<String>,
    pub section: ConfigSection,
    pub file: Option<GeneratedFile>,
    pub records: Vec<ResourceRecord>,
}

impl BehaviorArtifact {
    pub fn line(config_line: String, section: ConfigSection) -> Self {
        Self {
            config_line: Some(config_line),
            section,
            ..Self::default()
        }
    }

    pub fn with_file(mut self, file: GeneratedFile) -> Self {
        self.file = Some(file);
        self
    }
}

/// A zone-related file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneArtifact {
    pub file_name: String,
    pub content: String,
    pub container_path: String,
    /// The file a server is configured to load
    pub primary: bool,
}
