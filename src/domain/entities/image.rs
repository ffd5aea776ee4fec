//! Resolved container image

use std::path::Path;

use crate::domain::ports::{Storage, StorageResult};
use crate::domain::value_objects::SoftwareFamily;

/// A fully resolved image declaration
///
/// Buildable images carry a software/version pair and are written out as a
/// Dockerfile; prebuilt images are referenced by tag in the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub name: String,
    pub software: Option<String>,
    pub version: Option<String>,
    /// Base image for buildable images, image tag for prebuilt ones
    pub from: String,
    pub packages: Vec<String>,
}

impl Image {
    pub fn is_prebuilt(&self) -> bool {
        self.software.is_none()
    }

    pub fn family(&self) -> Option<SoftwareFamily> {
        self.software.as_deref().map(SoftwareFamily::from_software)
    }

    fn base_packages(&self) -> Vec<String> {
        match self.family() {
            Some(SoftwareFamily::Bind) => vec!["bind9".into(), "bind9-utils".into()],
            Some(SoftwareFamily::Unbound) => vec!["unbound".into()],
            Some(SoftwareFamily::Other(name)) => vec![name],
            None => Vec::new(),
        }
    }

    fn command(&self) -> Option<&'static str> {
        match self.family() {
            Some(SoftwareFamily::Bind) => {
                Some(r#"CMD ["named", "-g", "-c", "/usr/local/etc/named.conf"]"#)
            }
            Some(SoftwareFamily::Unbound) => Some(
                r#"CMD ["unbound", "-d", "-c", "/usr/local/etc/unbound/unbound.conf"]"#,
            ),
            _ => None,
        }
    }

    /// Dockerfile text for a buildable image
    pub fn dockerfile(&self) -> String {
        let mut packages = self.base_packages();
        for package in &self.packages {
            if !packages.contains(package) {
                packages.push(package.clone());
            }
        }

        let mut out = format!("FROM {}\n", self.from);
        if let (Some(software), Some(version)) = (&self.software, &self.version) {
            out.push_str(&format!(
                "LABEL org.dnsbuilder.software=\"{}\" org.dnsbuilder.version=\"{}\"\n",
                software, version
            ));
        }
        if !packages.is_empty() {
            out.push_str(&format!(
                "RUN apt-get update \\\n    && apt-get install -y --no-install-recommends {} \\\n    && rm -rf /var/lib/apt/lists/*\n",
                packages.join(" ")
            ));
        }
        out.push_str("RUN mkdir -p /usr/local/etc/zones /usr/local/etc/unbound/zones\n");
        if let Some(cmd) = self.command() {
            out.push_str(cmd);
            out.push('\n');
        }
        out
    }

    /// Write the image build files into `dir`
    pub fn write(&self, storage: &dyn Storage, dir: &Path) -> StorageResult<()> {
        if self.is_prebuilt() {
            return Ok(());
        }
        storage.write_text(&dir.join("Dockerfile"), &self.dockerfile())
    }
}
