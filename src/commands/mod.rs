//! Command handlers for the dnsbuilder binary

pub mod build;
pub mod check;
pub mod map;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use dnsbuilder::config::Settings;
use dnsbuilder::domain::entities::ProjectConfig;
use dnsbuilder::domain::ports::{ProjectRepository, Storage};
use dnsbuilder::infrastructure::{LocalStorage, ShellAutomation, YamlProjectRepository};
use dnsbuilder::BuildUseCase;

/// Everything a command needs before touching the pipeline
pub struct Session {
    pub project: ProjectConfig,
    pub settings: Settings,
    /// Directory holding the testbed file; relative sources resolve here
    pub base_dir: PathBuf,
    pub storage: Arc<dyn Storage>,
}

impl Session {
    pub fn open(config: &Path) -> Result<Self> {
        let storage: Arc<dyn Storage> = Arc::new(LocalStorage::new());
        let repository = YamlProjectRepository::new(storage.clone());
        let (project, warnings) = repository
            .load_with_warnings(config)
            .with_context(|| format!("loading {}", config.display()))?;
        for warning in &warnings {
            eprintln!("warning: {}", warning);
        }

        let base_dir = config
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let (settings, warnings) = Settings::resolve(Some(&base_dir)).context("loading settings")?;
        for warning in &warnings {
            eprintln!("warning: {}", warning);
        }

        Ok(Self {
            project,
            settings,
            base_dir,
            storage,
        })
    }

    /// Use case wired with the shell hook runner; signing is added by `build`
    pub fn use_case(&self) -> BuildUseCase {
        BuildUseCase::new(self.storage.clone())
            .with_automation(Arc::new(ShellAutomation::new().with_workdir(&self.base_dir)))
    }
}
