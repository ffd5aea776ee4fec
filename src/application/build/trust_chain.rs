//! Trust chain builder
//!
//! Runs once, after every service has written its zones and keys. Zones are
//! discovered from the KSK files in the key namespace, linked to their
//! structural parents, and re-signed bottom-up so each parent carries its
//! children's DS records. Afterwards all KSKs and DS records are collected
//! into trust anchor files for resolvers.
//!
//! Every failure here is a warning: a zone that cannot be re-signed keeps
//! the signature it got during generation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::application::build::layout::WorkspaceLayout;
use crate::domain::ports::{GeneratedKey, KeyRole, Storage, StorageResult, ZoneSigner};
use crate::domain::services::{resign_zone, KeyMaterial};
use crate::domain::value_objects::ZoneName;

pub const ALL_KSK: &str = "all.ksk.key";
pub const ALL_DS: &str = "all.ds";
pub const BIND_TRUSTED_KEYS: &str = "all.ksk.key.bind";
pub const PDNS_TRUST_ANCHORS: &str = "all.ds.pdns";

/// A zone found in the key namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustNode {
    pub zone: ZoneName,
    pub material: KeyMaterial,
    pub parent: Option<ZoneName>,
    pub children: Vec<ZoneName>,
}

/// What one trust-chain pass did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustChainReport {
    pub zones: Vec<ZoneName>,
    pub resigned: Vec<ZoneName>,
    pub failed: Vec<ZoneName>,
    pub anchors: Vec<PathBuf>,
}

pub struct TrustChainBuilder<'a> {
    storage: &'a dyn Storage,
    layout: &'a WorkspaceLayout,
    signer: &'a dyn ZoneSigner,
}

impl<'a> TrustChainBuilder<'a> {
    pub fn new(storage: &'a dyn Storage, layout: &'a WorkspaceLayout, signer: &'a dyn ZoneSigner) -> Self {
        Self {
            storage,
            layout,
            signer,
        }
    }

    pub fn run(&self) -> TrustChainReport {
        info!("building DNSSEC trust chain");
        let graph = self.discover();
        let mut report = TrustChainReport {
            zones: graph.keys().cloned().collect(),
            ..TrustChainReport::default()
        };

        for zone in signing_order(&graph) {
            let Some(node) = graph.get(&zone) else {
                continue;
            };
            if node.children.is_empty() {
                continue;
            }
            match self.resign(node, &graph) {
                Ok(()) => {
                    info!(zone = %zone, children = node.children.len(), "zone re-signed with delegations");
                    report.resigned.push(zone);
                }
                Err(reason) => {
                    warn!(zone = %zone, %reason, "skipping trust-chain re-signing");
                    report.failed.push(zone);
                }
            }
        }

        report.anchors = self.write_anchors();
        report
    }

    /// Zones with key material, keyed by zone name
    pub fn discover(&self) -> BTreeMap<ZoneName, TrustNode> {
        let root = self.layout.keys_root();
        let ksk_files = match self.storage.glob(&root, "*/*.ksk.key") {
            Ok(files) => files,
            Err(e) => {
                warn!(error = %e, "cannot scan key namespace");
                return BTreeMap::new();
            }
        };

        let mut graph: BTreeMap<ZoneName, TrustNode> = BTreeMap::new();
        for path in ksk_files {
            let Some(material) = self.material_for(&path) else {
                continue;
            };
            let zone = ZoneName::new(&material.zone);
            if let Some(existing) = graph.get(&zone) {
                warn!(
                    zone = %zone,
                    kept = %existing.material.service,
                    ignored = %material.service,
                    "zone is signed by more than one service; keeping the first"
                );
                continue;
            }
            graph.insert(
                zone.clone(),
                TrustNode {
                    parent: zone.parent(),
                    zone,
                    material,
                    children: Vec::new(),
                },
            );
        }

        let edges: Vec<(ZoneName, ZoneName)> = graph
            .values()
            .filter_map(|node| Some((node.parent.clone()?, node.zone.clone())))
            .collect();
        for (parent, child) in edges {
            if let Some(node) = graph.get_mut(&parent) {
                node.children.push(child);
            }
        }
        for node in graph.values_mut() {
            node.children.sort();
        }
        graph
    }

    fn material_for(&self, ksk_path: &Path) -> Option<KeyMaterial> {
        let meta_path = ksk_path
            .to_string_lossy()
            .strip_suffix(".ksk.key")
            .map(|stem| PathBuf::from(format!("{}.meta.json", stem)))?;
        let text = match self.storage.read_text(&meta_path) {
            Ok(text) => text,
            Err(e) => {
                warn!(path = %meta_path.display(), error = %e, "key metadata missing");
                return None;
            }
        };
        match serde_json::from_str(&text) {
            Ok(material) => Some(material),
            Err(e) => {
                warn!(path = %meta_path.display(), error = %e, "key metadata unreadable");
                None
            }
        }
    }

    fn resign(&self, node: &TrustNode, graph: &BTreeMap<ZoneName, TrustNode>) -> Result<(), String> {
        let service = node.material.service.as_str();
        let unsigned = self
            .storage
            .read_text(&self.layout.temp_unsigned(service, &node.zone))
            .map_err(|e| format!("unsigned zone: {}", e))?;

        let mut child_ds = Vec::with_capacity(node.children.len());
        for child in &node.children {
            let Some(child_node) = graph.get(child) else {
                continue;
            };
            let path = self.layout.ds_file(&child_node.material.service, child);
            let ds = self
                .storage
                .read_text(&path)
                .map_err(|e| format!("DS record of {}: {}", child, e))?;
            child_ds.push(ds);
        }

        let zsk = self
            .load_key(service, &node.zone, KeyRole::Zsk, &node.material.zsk)
            .map_err(|e| format!("zone-signing key: {}", e))?;
        let ksk = self
            .load_key(service, &node.zone, KeyRole::Ksk, &node.material.ksk)
            .map_err(|e| format!("key-signing key: {}", e))?;

        let signed = resign_zone(self.signer, &node.zone, &unsigned, &child_ds, &zsk, &ksk)
            .map_err(|e| e.to_string())?;

        self.storage
            .write_text(&self.layout.temp_signed(service, &node.zone), &signed.signed)
            .map_err(|e| e.to_string())?;
        self.storage
            .write_text(&self.layout.ds_file(service, &node.zone), &signed.ds_record)
            .map_err(|e| e.to_string())?;
        debug!(zone = %node.zone, service, "re-signed zone persisted");
        Ok(())
    }

    fn load_key(&self, service: &str, zone: &ZoneName, role: KeyRole, basename: &str) -> StorageResult<GeneratedKey> {
        Ok(GeneratedKey {
            basename: basename.to_string(),
            public_key: self
                .storage
                .read_text(&self.layout.key_file(service, zone, role, "key"))?,
            private_key: self
                .storage
                .read_text(&self.layout.key_file(service, zone, role, "private"))?,
        })
    }

    fn write_anchors(&self) -> Vec<PathBuf> {
        let mut written = Vec::new();

        if let Some(keys) = self.combine("*/*.ksk.key", ALL_KSK, &mut written) {
            match bind_trusted_keys(&keys) {
                Some(text) => self.write_anchor(BIND_TRUSTED_KEYS, &text, &mut written),
                None => warn!("no DNSKEY records found; skipping {}", BIND_TRUSTED_KEYS),
            }
        }
        if let Some(ds) = self.combine("*/*.ds", ALL_DS, &mut written) {
            match pdns_trust_anchors(&ds) {
                Some(text) => self.write_anchor(PDNS_TRUST_ANCHORS, &text, &mut written),
                None => warn!("no DS records found; skipping {}", PDNS_TRUST_ANCHORS),
            }
        }
        written
    }

    fn combine(&self, pattern: &str, output: &str, written: &mut Vec<PathBuf>) -> Option<String> {
        let files = self
            .storage
            .glob(&self.layout.keys_root(), pattern)
            .unwrap_or_default();
        let parts: Vec<String> = files
            .iter()
            .filter_map(|path| match self.storage.read_text(path) {
                Ok(text) => Some(text.trim().to_string()),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "cannot read key file");
                    None
                }
            })
            .filter(|text| !text.is_empty())
            .collect();

        if parts.is_empty() {
            warn!(pattern, "no inputs found; skipping {}", output);
            return None;
        }
        let text = parts.join("\n\n") + "\n";
        self.write_anchor(output, &text, written);
        Some(text)
    }

    fn write_anchor(&self, name: &str, text: &str, written: &mut Vec<PathBuf>) {
        let path = self.layout.trust_anchor(name);
        match self.storage.write_text(&path, text) {
            Ok(()) => written.push(path),
            Err(e) => warn!(path = %path.display(), error = %e, "cannot write trust anchor"),
        }
    }
}

/// Post-order over the zone forest: every zone comes after its children
pub fn signing_order(graph: &BTreeMap<ZoneName, TrustNode>) -> Vec<ZoneName> {
    fn visit(zone: &ZoneName, graph: &BTreeMap<ZoneName, TrustNode>, out: &mut Vec<ZoneName>) {
        if let Some(node) = graph.get(zone) {
            for child in &node.children {
                visit(child, graph, out);
            }
        }
        out.push(zone.clone());
    }

    let mut order = Vec::with_capacity(graph.len());
    for node in graph.values() {
        let is_root = node
            .parent
            .as_ref()
            .map_or(true, |parent| !graph.contains_key(parent));
        if is_root {
            visit(&node.zone, graph, &mut order);
        }
    }
    order
}

fn record_fields<'l>(line: &'l str, rtype: &str) -> Option<(&'l str, Vec<&'l str>)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
        return None;
    }
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let at = tokens.iter().position(|t| *t == rtype)?;
    Some((*tokens.first()?, tokens[at + 1..].to_vec()))
}

fn absolute(zone: &str) -> String {
    if zone.ends_with('.') {
        zone.to_string()
    } else {
        format!("{}.", zone)
    }
}

/// BIND `trusted-keys` block built from DNSKEY lines
pub fn bind_trusted_keys(keys: &str) -> Option<String> {
    let entries: Vec<String> = keys
        .lines()
        .filter_map(|line| record_fields(line, "DNSKEY"))
        .filter(|(_, rdata)| rdata.len() >= 4)
        .map(|(zone, rdata)| {
            format!(
                "    \"{}\" {} {} {} \"{}\";",
                absolute(zone),
                rdata[0],
                rdata[1],
                rdata[2],
                rdata[3..].concat()
            )
        })
        .collect();
    if entries.is_empty() {
        return None;
    }
    Some(format!("trusted-keys {{\n{}\n}};\n", entries.join("\n")))
}

#[derive(Serialize)]
struct PdnsConfig {
    dnssec: PdnsDnssec,
}

#[derive(Serialize)]
struct PdnsDnssec {
    trustanchors: Vec<PdnsAnchor>,
}

#[derive(Serialize)]
struct PdnsAnchor {
    name: String,
    dsrecords: Vec<String>,
}

/// PowerDNS recursor trust anchors built from DS lines
pub fn pdns_trust_anchors(ds: &str) -> Option<String> {
    let mut by_zone: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (zone, rdata) in ds.lines().filter_map(|line| record_fields(line, "DS")) {
        if rdata.len() < 4 {
            continue;
        }
        let record = format!("{} {} {} {}", rdata[0], rdata[1], rdata[2], rdata[3..].concat());
        by_zone.entry(absolute(zone)).or_default().push(record);
    }
    if by_zone.is_empty() {
        return None;
    }
    let config = PdnsConfig {
        dnssec: PdnsDnssec {
            trustanchors: by_zone
                .into_iter()
                .map(|(name, dsrecords)| PdnsAnchor { name, dsrecords })
                .collect(),
        },
    };
    serde_yaml_ng::to_string(&config).ok()
}
