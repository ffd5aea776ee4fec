//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `storage/` - Storage implementations (Local, Memory)
//! - `signer/` - Zone signing through the BIND DNSSEC tools
//! - `automation/` - Hook runners (shell, no-op)
//! - `repositories/` - Repository implementations (YAML project files)

pub mod automation;
pub mod repositories;
pub mod signer;
pub mod storage;

pub use automation::{NoopAutomation, ShellAutomation};
pub use repositories::YamlProjectRepository;
pub use signer::BindDnssecSigner;
pub use storage::{LocalStorage, MemoryStorage};
