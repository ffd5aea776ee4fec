//! Domain Layer
//!
//! The testbed model and the pure compilation steps of the build pipeline.
//!
//! ## Structure
//!
//! - `entities/` - Project declaration, images, behaviors, records, artifacts
//! - `value_objects/` - Small validated types (Subnet, ZoneName, Volume, ...)
//! - `services/` - Resolution, substitution, planning, the behavior language,
//!   zone synthesis and the trust-chain pass
//! - `ports/` - Capabilities provided by infrastructure (storage, signer, automation)
//!
//! Services only touch files through the `Storage` port and only run
//! external tools through the `ZoneSigner` and `Automation` ports.

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
