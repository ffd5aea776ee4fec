//! Zone Name Value Object

use std::fmt;

/// A dot-terminated DNS zone origin (`.`, `com.`, `example.com.`)
///
/// Built from the zone keys used in behavior scripts, which may or may not
/// carry the trailing dot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoneName(String);

impl ZoneName {
    pub fn new(key: &str) -> Self {
        let trimmed = key.trim().trim_end_matches('.');
        if trimmed.is_empty() {
            Self(".".to_string())
        } else {
            Self(format!("{}.", trimmed))
        }
    }

    pub fn root() -> Self {
        Self(".".to_string())
    }

    pub fn is_root(&self) -> bool {
        self.0 == "."
    }

    /// Origin with trailing dot
    pub fn origin(&self) -> &str {
        &self.0
    }

    /// Number of labels: 0 for the root, 1 for a TLD, ...
    pub fn depth(&self) -> usize {
        if self.is_root() {
            0
        } else {
            self.stem().split('.').count()
        }
    }

    /// Structural parent: root has none, a TLD's parent is the root
    pub fn parent(&self) -> Option<ZoneName> {
        if self.is_root() {
            return None;
        }
        match self.stem().split_once('.') {
            Some((_, rest)) => Some(ZoneName::new(rest)),
            None => Some(ZoneName::root()),
        }
    }

    /// Name without trailing dot; `root` for the root zone
    pub fn stem(&self) -> &str {
        if self.is_root() {
            "root"
        } else {
            self.0.trim_end_matches('.')
        }
    }

    /// Name used inside server configuration (`.` or `example.com`)
    pub fn config_name(&self) -> &str {
        if self.is_root() {
            "."
        } else {
            self.stem()
        }
    }

    /// Zone file name: `db.<zone>` or `db.root`
    pub fn file_name(&self) -> String {
        format!("db.{}", self.stem())
    }

    /// Absolute owner name for `name` declared inside this zone
    pub fn qualify(&self, name: &str) -> String {
        if name == "@" {
            self.0.clone()
        } else if name.ends_with('.') {
            name.to_string()
        } else if self.is_root() {
            format!("{}.", name)
        } else {
            format!("{}.{}", name, self.0)
        }
    }

    /// Owner name as printed in this zone's file
    pub fn relativize(&self, owner: &str) -> String {
        if owner == self.0 {
            return "@".to_string();
        }
        if self.is_root() {
            return owner.trim_end_matches('.').to_string();
        }
        match owner.strip_suffix(&format!(".{}", self.0)) {
            Some(relative) if !relative.is_empty() => relative.to_string(),
            _ => owner.to_string(),
        }
    }
}

impl fmt::Display for ZoneName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_name_normalizes_trailing_dot() {
        assert_eq!(ZoneName::new("com").origin(), "com.");
        assert_eq!(ZoneName::new("com.").origin(), "com.");
        assert_eq!(ZoneName::new(".").origin(), ".");
    }

    #[test]
    fn zone_name_parent_chain() {
        let zone = ZoneName::new("www.example.com");
        assert_eq!(zone.parent(), Some(ZoneName::new("example.com")));
        assert_eq!(ZoneName::new("com").parent(), Some(ZoneName::root()));
        assert_eq!(ZoneName::root().parent(), None);
    }

    #[test]
    fn zone_name_depth() {
        assert_eq!(ZoneName::root().depth(), 0);
        assert_eq!(ZoneName::new("com").depth(), 1);
        assert_eq!(ZoneName::new("example.com").depth(), 2);
    }

    #[test]
    fn zone_name_file_name() {
        assert_eq!(ZoneName::new("com.").file_name(), "db.com");
        assert_eq!(ZoneName::root().file_name(), "db.root");
    }

    #[test]
    fn qualify_handles_apex_relative_and_absolute() {
        let zone = ZoneName::new("com");
        assert_eq!(zone.qualify("@"), "com.");
        assert_eq!(zone.qualify("example"), "example.com.");
        assert_eq!(zone.qualify("ns.example.net."), "ns.example.net.");
        assert_eq!(ZoneName::root().qualify("com"), "com.");
    }

    #[test]
    fn relativize_strips_zone_suffix() {
        let zone = ZoneName::new("com");
        assert_eq!(zone.relativize("com."), "@");
        assert_eq!(zone.relativize("ns1.com."), "ns1");
        assert_eq!(zone.relativize("ns.example.net."), "ns.example.net.");
        assert_eq!(ZoneName::root().relativize("com."), "com");
        assert_eq!(ZoneName::root().relativize("."), "@");
    }
}
