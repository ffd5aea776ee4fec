//! Domain Value Objects
//!
//! Small immutable types with validated construction.

mod config_warning;
mod software;
mod subnet;
mod target;
mod volume;
mod zone_name;

pub use config_warning::ConfigWarning;
pub use software::SoftwareFamily;
pub use subnet::{Subnet, SubnetError};
pub use target::TargetRef;
pub use volume::{VolumeMode, VolumeSource, VolumeSpec};
pub use zone_name::ZoneName;
