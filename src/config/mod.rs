//! Tool settings for dnsbuilder
//!
//! Settings are separate from the testbed declaration and layered:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (DNSB_*)
//! 3. Project settings (dnsbuilder.toml next to the testbed file)
//! 4. User settings (~/.config/dnsbuilder/config.toml)
//! 5. Built-in defaults (lowest priority)

mod loader;
mod types;

pub use crate::domain::value_objects::ConfigWarning;

pub use loader::{user_settings_path, PROJECT_SETTINGS_FILE};
pub use types::{BuildSettings, Settings, SignerSettings};
