//! Zone generator
//!
//! Renders one authoritative zone per aggregated record set, prefixed with
//! the SOA/NS/A defaults, and optionally signs it. Signing failures are
//! logged and the unsigned zone is served instead.

mod naming;
mod render;
mod signing;

use std::net::Ipv4Addr;

use tracing::{debug, warn};

use crate::domain::entities::{ZoneArtifact, ZoneRecordSet};
use crate::domain::ports::ZoneSigner;
use crate::domain::value_objects::ZoneName;

pub use naming::NameServerRegistry;
pub use render::{default_records, render_zone, DEFAULT_TTL, SOA_TTL};
pub use signing::{nsec3_salt, resign_zone, sign_zone, KeyMaterial, SignedOutput};

/// Files produced for one zone
#[derive(Debug, Clone)]
pub struct ZoneOutput {
    pub zone: ZoneName,
    pub artifacts: Vec<ZoneArtifact>,
    /// Present when signing succeeded
    pub signed: Option<SignedOutput>,
}

impl ZoneOutput {
    /// The file the server loads
    pub fn primary(&self) -> Option<&ZoneArtifact> {
        self.artifacts.iter().find(|a| a.primary)
    }
}

pub struct ZoneGenerator<'a> {
    names: &'a NameServerRegistry,
    serial: u32,
    signer: Option<&'a dyn ZoneSigner>,
}

impl<'a> ZoneGenerator<'a> {
    pub fn new(names: &'a NameServerRegistry, serial: u32) -> Self {
        Self {
            names,
            serial,
            signer: None,
        }
    }

    /// Sign generated zones with `signer`
    pub fn with_signer(mut self, signer: &'a dyn ZoneSigner) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Unsigned zone text with the default records prepended
    pub fn render(&self, service: &str, address: Ipv4Addr, set: &ZoneRecordSet) -> String {
        let zone = &set.zone;
        let ns_target = zone.qualify(&self.names.label(zone.depth(), service));
        let mut full = ZoneRecordSet::new(zone.clone());
        full.records = default_records(zone, &ns_target, &address.to_string(), self.serial);
        full.records.extend(set.records.iter().cloned());
        render_zone(&full)
    }

    /// Render, and sign when a signer is configured.
    ///
    /// `container_dir` is where the server sees the zone files.
    pub fn generate(
        &self,
        service: &str,
        address: Ipv4Addr,
        set: &ZoneRecordSet,
        container_dir: &str,
    ) -> ZoneOutput {
        let zone = set.zone.clone();
        let file_name = zone.file_name();
        let unsigned = self.render(service, address, set);
        let artifact = |name: String, content: String, primary: bool| ZoneArtifact {
            container_path: format!("{}/{}", container_dir, name),
            file_name: name,
            content,
            primary,
        };

        let Some(signer) = self.signer else {
            debug!(zone = %zone, service, "zone rendered");
            return ZoneOutput {
                artifacts: vec![artifact(file_name, unsigned, true)],
                zone,
                signed: None,
            };
        };

        match sign_zone(signer, &zone, &unsigned) {
            Ok(signed) => {
                debug!(zone = %zone, service, "zone signed");
                let artifacts = vec![
                    artifact(format!("{}.signed", file_name), signed.signed.clone(), true),
                    artifact(file_name, signed.unsigned.clone(), false),
                    artifact(
                        format!("{}.key", signed.zsk.basename),
                        signed.zsk.public_key.clone(),
                        false,
                    ),
                    artifact(
                        format!("{}.key", signed.ksk.basename),
                        signed.ksk.public_key.clone(),
                        false,
                    ),
                ];
                ZoneOutput {
                    zone,
                    artifacts,
                    signed: Some(signed),
                }
            }
            Err(e) => {
                warn!(zone = %zone, service, error = %e, "DNSSEC signing failed; serving the unsigned zone");
                ZoneOutput {
                    artifacts: vec![artifact(file_name, unsigned, true)],
                    zone,
                    signed: None,
                }
            }
        }
    }
}
