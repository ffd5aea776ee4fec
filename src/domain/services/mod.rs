//! Domain Services
//!
//! Pure build logic over the domain entities. Anything that touches the
//! workspace or an external tool goes through a port.

pub mod behavior;
pub mod config_resolver;
pub mod image_resolver;
pub mod merge;
pub mod network_planner;
pub mod substitutor;
pub mod topology;
pub mod zone;

pub use behavior::{
    master_config_line, parse_behavior, parse_script, render_behavior, BehaviorSyntaxError,
    RenderContext, Statement,
};
pub use config_resolver::ConfigResolver;
pub use image_resolver::{resolve_images, DEFAULT_BASE_IMAGE};
pub use merge::{deep_merge, merge_mappings};
pub use network_planner::{is_buildable, NetworkPlanner};
pub use substitutor::{Scope, VariableSubstitutor};
pub use topology::{Topology, TopologyEdge};
pub use zone::{
    nsec3_salt, resign_zone, sign_zone, KeyMaterial, NameServerRegistry, SignedOutput, ZoneGenerator,
    ZoneOutput,
};
