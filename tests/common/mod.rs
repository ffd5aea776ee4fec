//! Common test utilities for dnsbuilder integration tests.
//!
//! This module provides:
//! - `TestEnv`: Isolated project and config directories plus CLI helpers
//! - `FakeSigner`: Deterministic zone signer that records its calls
//! - Fixtures: Reusable testbed declarations

#![allow(dead_code)]

pub mod env;
pub mod fixtures;
pub mod signer;

pub use env::*;
pub use fixtures::*;
pub use signer::*;
