//! Error types for dnsbuilder
//!
//! One enum covers every fatal failure of the build pipeline. Port-level
//! errors (storage, signer, automation) convert into it at the boundary.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::ports::{AutomationError, StorageError};

/// Result type alias for dnsbuilder operations
pub type DnsbResult<T> = Result<T, DnsbError>;

/// Main error type for dnsbuilder operations
#[derive(Error, Debug)]
pub enum DnsbError {
    /// A service, template, image or variable reference points at nothing
    #[error("reference not found: {0}")]
    ReferenceNotFound(String),

    /// Inheritance loop between two services (or images)
    #[error("circular dependency detected: '{from}' -> '{to}'")]
    CircularDependency { from: String, to: String },

    /// Structurally invalid service declaration
    #[error("invalid build definition: {0}")]
    BuildDefinition(String),

    /// Structurally invalid image declaration
    #[error("invalid image definition: {0}")]
    ImageDefinition(String),

    /// Declaration the pipeline knows about but cannot render
    #[error("unsupported feature: {0}")]
    UnsupportedFeature(String),

    /// Behavior script failure for one service
    #[error("behavior error in service '{service}': {message}")]
    Behavior { service: String, message: String },

    /// Volume declaration failure for one service
    #[error("volume error in service '{service}': {message}")]
    Volume { service: String, message: String },

    /// Invalid static address or subnet
    #[error("network definition error: {0}")]
    NetworkDefinition(String),

    /// Orchestration-level failure
    #[error("build failed: {0}")]
    Build(String),

    /// Testbed or settings file could not be loaded
    #[error("invalid configuration in {file}: {message}")]
    Config { file: PathBuf, message: String },

    /// Storage capability failure
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Automation hook failure
    #[error(transparent)]
    Automation(#[from] AutomationError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML (de)serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl DnsbError {
    pub(crate) fn behavior(service: &str, message: impl Into<String>) -> Self {
        DnsbError::Behavior {
            service: service.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn volume(service: &str, message: impl Into<String>) -> Self {
        DnsbError::Volume {
            service: service.to_string(),
            message: message.into(),
        }
    }
}
