//! DNS software family

use std::fmt;

/// Backend family a service image runs
///
/// Rendering of behaviors is only defined for the BIND-like and
/// Unbound-like families. Anything else is carried by name so error
/// messages can mention it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SoftwareFamily {
    Bind,
    Unbound,
    Other(String),
}

impl SoftwareFamily {
    pub fn from_software(software: &str) -> Self {
        match software.trim().to_ascii_lowercase().as_str() {
            "bind" | "bind9" | "named" => SoftwareFamily::Bind,
            "unbound" => SoftwareFamily::Unbound,
            other => SoftwareFamily::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            SoftwareFamily::Bind => "bind",
            SoftwareFamily::Unbound => "unbound",
            SoftwareFamily::Other(name) => name,
        }
    }

    /// Container directory generated zone and hint files are mounted into
    pub fn zones_dir(&self) -> &'static str {
        match self {
            SoftwareFamily::Unbound => "/usr/local/etc/unbound/zones",
            _ => "/usr/local/etc/zones",
        }
    }

    /// Statement appended to a main config file to pull in `container_path`
    pub fn include_line(&self, container_path: &str) -> Option<String> {
        match self {
            SoftwareFamily::Bind => Some(format!(
                "# Auto-Include by DNS Builder\ninclude \"{}\";\n",
                container_path
            )),
            SoftwareFamily::Unbound => Some(format!(
                "\n# Auto-Include by DNS Builder\ninclude: \"{}\"\n",
                container_path
            )),
            SoftwareFamily::Other(_) => None,
        }
    }
}

impl fmt::Display for SoftwareFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
