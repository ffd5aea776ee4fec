//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod automation;
pub mod project_repository;
pub mod signer;
pub mod storage;

pub use automation::{Automation, AutomationError, AutomationPhase, PASS_VERDICT};
pub use project_repository::ProjectRepository;
pub use signer::{GeneratedKey, KeyRole, SignedZone, SignerError, SigningRequest, ZoneSigner};
pub use storage::{Storage, StorageError, StorageResult};
