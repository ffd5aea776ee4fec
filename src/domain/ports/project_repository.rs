//! Project repository port - abstracts loading testbed declarations.

use std::path::Path;

use crate::domain::entities::ProjectConfig;
use crate::domain::value_objects::ConfigWarning;
use crate::error::DnsbResult;

/// Loads a testbed declaration with its includes expanded.
pub trait ProjectRepository: Send + Sync {
    /// Load a project and collect warnings about unknown keys.
    fn load_with_warnings(&self, path: &Path) -> DnsbResult<(ProjectConfig, Vec<ConfigWarning>)>;

    /// Load a project, dropping warnings.
    fn load(&self, path: &Path) -> DnsbResult<ProjectConfig> {
        self.load_with_warnings(path).map(|(project, _)| project)
    }
}
