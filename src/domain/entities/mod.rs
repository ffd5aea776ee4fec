//! Domain Entities
//!
//! - `ProjectConfig` - the typed testbed declaration
//! - `Image` - a resolved container image
//! - `Behavior` - one parsed behavior statement
//! - `ResourceRecord` / `ZoneRecordSet` - DNS data for a master zone
//! - `BehaviorArtifact` / `ZoneArtifact` - files and config lines a service gets

mod artifact;
mod behavior;
mod image;
mod project;
mod record;

pub use artifact::{BehaviorArtifact, ConfigSection, GeneratedFile, ZoneArtifact};
pub use behavior::{Behavior, BehaviorKind, MasterRecord};
pub use image::Image;
pub use project::{AutoHooks, ImageConfig, ProjectConfig, ServiceMap};
pub use record::{RecordType, ResourceRecord, ZoneRecordSet};
