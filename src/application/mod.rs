//! Application Layer
//!
//! Use cases that orchestrate the business flow.
//! This layer:
//! - Depends on Domain layer (entities, services, ports)
//! - Does NOT contain business rules (those are in Domain)
//! - Coordinates between Infrastructure and Domain
//!
//! ## Use Cases
//!
//! - `BuildUseCase` - Orchestrates the build flow (resolve, plan, generate, sign, write manifest)

pub mod build;

pub use build::{
    BuildContext, BuildOptions, BuildResult, BuildUseCase, Manifest, PreparedBuild,
    TrustChainReport, WorkspaceLayout,
};
