//! Build Result

use std::net::Ipv4Addr;
use std::path::PathBuf;

use indexmap::IndexMap;

use crate::application::build::context::BuildContext;
use crate::application::build::trust_chain::TrustChainReport;
use crate::domain::services::Topology;

/// Everything a build decided before writing artifacts
#[derive(Debug, Clone)]
pub struct PreparedBuild {
    pub context: BuildContext,
    pub topology: Topology,
}

impl PreparedBuild {
    /// Buildable service names in declaration order
    pub fn services(&self) -> Vec<String> {
        self.context
            .buildable()
            .into_iter()
            .map(|(name, _)| name.to_string())
            .collect()
    }
}

/// Result of a successful build
#[derive(Debug, Clone)]
pub struct BuildResult {
    /// Written manifest
    pub manifest: PathBuf,
    /// Built services in declaration order
    pub services: Vec<String>,
    pub addresses: IndexMap<String, Ipv4Addr>,
    /// Zones signed during generation, as `(service, zone origin)`
    pub signed_zones: Vec<(String, String)>,
    /// Present when the trust-chain pass ran
    pub trust_chain: Option<TrustChainReport>,
    /// DOT export, when requested
    pub graph: Option<PathBuf>,
}

impl BuildResult {
    pub fn service_count(&self) -> usize {
        self.services.len()
    }
}
