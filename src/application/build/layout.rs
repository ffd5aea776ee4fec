//! Workspace layout
//!
//! Every path the build writes is derived here, under one output root:
//!
//! ```text
//! <root>/docker-compose.yml
//! <root>/<service>/Dockerfile
//! <root>/<service>/contents/...          copied volumes, generated confs
//! <root>/<service>/contents/zones/...    zone and hint files
//! <root>/.dnsb/keys/<service>/<stem>.{zsk,ksk}.{key,private}
//! <root>/.dnsb/keys/<service>/<stem>.{ds,meta.json}
//! <root>/.dnsb/temp/<service>/<stem>/db.<stem>[.signed]
//! ```

use std::path::{Path, PathBuf};

use crate::domain::ports::KeyRole;
use crate::domain::value_objects::ZoneName;

pub const MANIFEST_FILE: &str = "docker-compose.yml";
pub const INTERNAL_DIR: &str = ".dnsb";
pub const CONTENTS_DIR: &str = "contents";
pub const ZONES_DIR: &str = "zones";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceLayout {
    root: PathBuf,
}

impl WorkspaceLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    pub fn service_dir(&self, service: &str) -> PathBuf {
        self.root.join(service)
    }

    pub fn contents_dir(&self, service: &str) -> PathBuf {
        self.service_dir(service).join(CONTENTS_DIR)
    }

    pub fn zones_dir(&self, service: &str) -> PathBuf {
        self.contents_dir(service).join(ZONES_DIR)
    }

    /// Manifest-relative host path for a file under a service's contents
    pub fn mount_source(&self, service: &str, relative: &Path) -> String {
        format!(
            "./{}/{}/{}",
            service,
            CONTENTS_DIR,
            relative.to_string_lossy().replace('\\', "/")
        )
    }

    pub fn keys_root(&self) -> PathBuf {
        self.root.join(INTERNAL_DIR).join("keys")
    }

    pub fn key_dir(&self, service: &str) -> PathBuf {
        self.keys_root().join(service)
    }

    pub fn key_file(&self, service: &str, zone: &ZoneName, role: KeyRole, ext: &str) -> PathBuf {
        self.key_dir(service)
            .join(format!("{}.{}.{}", zone.stem(), role, ext))
    }

    pub fn ds_file(&self, service: &str, zone: &ZoneName) -> PathBuf {
        self.key_dir(service).join(format!("{}.ds", zone.stem()))
    }

    pub fn meta_file(&self, service: &str, zone: &ZoneName) -> PathBuf {
        self.key_dir(service).join(format!("{}.meta.json", zone.stem()))
    }

    pub fn temp_root(&self) -> PathBuf {
        self.root.join(INTERNAL_DIR).join("temp")
    }

    pub fn temp_dir(&self, service: &str, zone: &ZoneName) -> PathBuf {
        self.temp_root().join(service).join(zone.stem())
    }

    pub fn temp_unsigned(&self, service: &str, zone: &ZoneName) -> PathBuf {
        self.temp_dir(service, zone).join(zone.file_name())
    }

    pub fn temp_signed(&self, service: &str, zone: &ZoneName) -> PathBuf {
        self.temp_dir(service, zone)
            .join(format!("{}.signed", zone.file_name()))
    }

    /// Location of a `key:` volume source
    pub fn key_source(&self, relative: &str) -> PathBuf {
        self.keys_root().join(relative.trim_start_matches('/'))
    }

    /// Aggregated trust anchor outputs
    pub fn trust_anchor(&self, name: &str) -> PathBuf {
        self.keys_root().join(name)
    }
}
