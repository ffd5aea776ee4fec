//! dnsbuilder - DNS testbed compiler
//!
//! dnsbuilder turns a declarative description of a DNS testbed (images,
//! services, behavior scripts) into per-service build directories, zone
//! files, an optional DNSSEC trust chain and a container deployment
//! manifest.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod resources;

// Re-exports for convenience
pub use application::{BuildOptions, BuildResult, BuildUseCase, PreparedBuild};
pub use config::Settings;
pub use domain::entities::ProjectConfig;
pub use error::{DnsbError, DnsbResult};
