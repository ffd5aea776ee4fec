//! Build Module
//!
//! Compiles a testbed declaration into deployable artifacts.
//!
//! ## Structure
//!
//! - `options` - Build options (`BuildOptions`)
//! - `result` - Result types (`BuildResult`, `PreparedBuild`)
//! - `use_case` - Phase orchestration (`BuildUseCase`)
//! - `context` - Phase-accumulated build state
//! - `layout` - Paths under the output root
//! - `service` - Per-service artifact generation
//! - `trust_chain` - The DNSSEC trust-chain pass
//! - `automation` - setup/modify/restrict hook runner
//! - `manifest` - The deployment manifest
//! - `pool` / `barrier` - Bounded worker pool with a leader barrier
//!
//! ## Usage
//!
//! ```ignore
//! use dnsbuilder::application::build::{BuildOptions, BuildUseCase};
//!
//! let use_case = BuildUseCase::new(storage).with_signer(signer);
//! let result = use_case.execute(project, &BuildOptions::new("output/lab"))?;
//! ```

pub mod automation;
mod barrier;
pub mod context;
pub mod layout;
pub mod manifest;
mod options;
pub mod pool;
mod result;
pub mod service;
pub mod trust_chain;
mod use_case;

pub use context::BuildContext;
pub use layout::WorkspaceLayout;
pub use manifest::Manifest;
pub use options::BuildOptions;
pub use result::{BuildResult, PreparedBuild};
pub use service::{ServiceArtifactGenerator, ServiceArtifacts};
pub use trust_chain::{TrustChainBuilder, TrustChainReport};
pub use use_case::BuildUseCase;
