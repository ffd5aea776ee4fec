//! Settings type definitions

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::DnsbResult;
use crate::infrastructure::signer::{DEFAULT_ALGORITHM, DEFAULT_KEYGEN, DEFAULT_SIGNZONE};

use super::loader;
use super::ConfigWarning;

/// Build defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSettings {
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Worker threads; unset means one per CPU
    #[serde(default)]
    pub jobs: Option<usize>,

    /// Force signing on or off for every authoritative service
    #[serde(default)]
    pub dnssec: Option<bool>,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            output: default_output(),
            jobs: None,
            dnssec: None,
        }
    }
}

fn default_output() -> PathBuf {
    PathBuf::from("output")
}

/// External DNSSEC tool invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerSettings {
    #[serde(default = "default_keygen")]
    pub keygen: String,

    #[serde(default = "default_signzone")]
    pub signzone: String,

    #[serde(default = "default_algorithm")]
    pub algorithm: String,
}

impl Default for SignerSettings {
    fn default() -> Self {
        Self {
            keygen: default_keygen(),
            signzone: default_signzone(),
            algorithm: default_algorithm(),
        }
    }
}

fn default_keygen() -> String {
    DEFAULT_KEYGEN.to_string()
}

fn default_signzone() -> String {
    DEFAULT_SIGNZONE.to_string()
}

fn default_algorithm() -> String {
    DEFAULT_ALGORITHM.to_string()
}

/// Main settings structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub build: BuildSettings,

    #[serde(default)]
    pub signer: SignerSettings,
}

impl Settings {
    /// Load settings from a single file
    pub fn load(path: &Path) -> DnsbResult<Self> {
        loader::load_with_warnings(path).map(|(settings, _)| settings)
    }

    /// Load settings from a single file, collecting unknown-key warnings
    pub fn load_with_warnings(path: &Path) -> DnsbResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Merge user and project settings files, then apply `DNSB_*` overrides
    pub fn resolve(project_dir: Option<&Path>) -> DnsbResult<(Self, Vec<ConfigWarning>)> {
        let user = loader::user_settings_path();
        let project = project_dir.map(|dir| dir.join(loader::PROJECT_SETTINGS_FILE));
        let (settings, warnings) = loader::load_layered(user.as_deref(), project.as_deref())?;
        Ok((settings.with_env_overrides(), warnings))
    }

    /// Apply environment variable overrides (DNSB_* prefix)
    pub fn with_env_overrides(self) -> Self {
        loader::apply_env(self, |name| std::env::var(name).ok())
    }
}
