//! Service artifact generator
//!
//! Produces everything one service needs: its directory and Dockerfile,
//! copied volumes, the main config with generated includes, behavior
//! output, zone files, and the service's manifest fragment.
//!
//! Generation runs in two phases around the trust-chain pass. `generate`
//! writes everything and leaves DNSSEC material in the key and temp
//! namespaces; `finalize` runs after the pass and picks up re-signed zones
//! and `key:` volumes.

use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_yaml_ng::{Mapping, Value};
use tracing::{debug, info, warn};

use crate::application::build::context::BuildContext;
use crate::application::build::layout::{WorkspaceLayout, ZONES_DIR};
use crate::domain::entities::{ConfigSection, Image, ZoneRecordSet};
use crate::domain::ports::{KeyRole, Storage, ZoneSigner};
use crate::domain::services::{
    master_config_line, parse_script, render_behavior, NameServerRegistry, RenderContext,
    ZoneGenerator, ZoneOutput,
};
use crate::domain::value_objects::{SoftwareFamily, VolumeSource, VolumeSpec, ZoneName};
use crate::error::{DnsbError, DnsbResult};
use crate::resources;

pub const GENERATED_CONF: &str = "generated_zones.conf";
pub const NETWORK_NAME: &str = "app_net";
pub const DEFAULT_CAP_ADD: &[&str] = &["NET_ADMIN"];

/// Keys consumed by the pipeline and never passed through to the manifest
pub const RESERVED_KEYS: &[&str] = &[
    "image",
    "ref",
    "mixins",
    "address",
    "behavior",
    "build",
    "volumes",
    "mounts",
    "cap_add",
    "auto",
    "extra_conf",
    "mirror",
    "dnssec",
];

/// What `generate` leaves for `finalize` and the manifest
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceArtifacts {
    pub service: String,
    /// Manifest entry for this service
    pub fragment: Mapping,
    /// Zones signed by this service, refreshed from the temp namespace
    pub signed_zones: Vec<ZoneName>,
    /// `key:` volumes: key-namespace path and copy destination
    pub key_volumes: Vec<(String, PathBuf)>,
}

struct MainConf {
    path: PathBuf,
    text: String,
}

#[derive(Default)]
struct Mounts {
    generated: Vec<String>,
    declared: Vec<String>,
}

impl Mounts {
    fn into_list(self) -> Vec<String> {
        let mut out: Vec<String> = Vec::with_capacity(self.generated.len() + self.declared.len());
        for mount in self.generated.into_iter().chain(self.declared) {
            if !out.contains(&mount) {
                out.push(mount);
            }
        }
        out
    }
}

pub struct ServiceArtifactGenerator<'a> {
    ctx: &'a BuildContext,
    names: &'a NameServerRegistry,
    serial: u32,
    base_dir: PathBuf,
    dnssec: Option<bool>,
    signer: Option<&'a dyn ZoneSigner>,
}

impl<'a> ServiceArtifactGenerator<'a> {
    pub fn new(ctx: &'a BuildContext, names: &'a NameServerRegistry, serial: u32) -> Self {
        Self {
            ctx,
            names,
            serial,
            base_dir: PathBuf::from("."),
            dnssec: None,
            signer: None,
        }
    }

    /// Directory relative volume sources resolve against
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    /// Override every service's `dnssec` key
    pub fn with_dnssec(mut self, dnssec: Option<bool>) -> Self {
        self.dnssec = dnssec;
        self
    }

    pub fn with_signer(mut self, signer: &'a dyn ZoneSigner) -> Self {
        self.signer = Some(signer);
        self
    }

    fn storage(&self) -> &dyn Storage {
        self.ctx.storage.as_ref()
    }

    fn layout(&self) -> &WorkspaceLayout {
        &self.ctx.layout
    }

    /// First phase: write all artifacts of one service
    pub fn generate(&self, service: &str) -> DnsbResult<ServiceArtifacts> {
        let conf = self.ctx.services.get(service).ok_or_else(|| {
            DnsbError::ReferenceNotFound(format!("service '{}' is not defined", service))
        })?;
        let image = self.ctx.image_of(conf);
        info!(service, image = image.map(|i| i.name.as_str()), "generating service artifacts");

        let contents = self.layout().contents_dir(service);
        self.storage().create_dir_all(&contents)?;
        if let Some(image) = image {
            image.write(self.storage(), &self.layout().service_dir(service))?;
        }

        let family = image.and_then(Image::family);
        let mut mounts = Mounts::default();
        let mut key_volumes = Vec::new();
        let mut main = self.process_volumes(service, conf, family.as_ref(), &mut mounts, &mut key_volumes)?;

        if let Some(extra) = conf.get("extra_conf").and_then(Value::as_str) {
            match main.as_mut() {
                Some(main) => {
                    push_block(&mut main.text, extra);
                }
                None => warn!(service, "'extra_conf' given but no main .conf volume to append it to"),
            }
        }

        let signed_zones = self.process_behavior(service, conf, family.as_ref(), main.as_mut(), &mut mounts)?;

        if let Some(main) = &main {
            self.storage().write_text(&main.path, &main.text)?;
            debug!(service, path = %main.path.display(), "main config written");
        }

        for raw in string_list(service, conf, "mounts")? {
            mounts.declared.push(raw);
        }

        let fragment = self.fragment(service, conf, image, mounts.into_list())?;
        Ok(ServiceArtifacts {
            service: service.to_string(),
            fragment,
            signed_zones,
            key_volumes,
        })
    }

    /// Second phase: pick up re-signed zones and copy `key:` volumes
    pub fn finalize(&self, artifacts: &ServiceArtifacts) -> DnsbResult<()> {
        let service = artifacts.service.as_str();
        for zone in &artifacts.signed_zones {
            let temp = self.layout().temp_signed(service, zone);
            let dest = self
                .layout()
                .zones_dir(service)
                .join(format!("{}.signed", zone.file_name()));
            match self.storage().read_text(&temp) {
                Ok(text) => self.storage().write_text(&dest, &text)?,
                Err(e) => warn!(service, zone = %zone, error = %e, "signed zone missing from temp namespace"),
            }
        }
        for (relative, dest) in &artifacts.key_volumes {
            let source = self.layout().key_source(relative);
            if !self.storage().exists(&source) {
                warn!(service, source = %source.display(), "key volume source was not produced; mount will be empty");
                continue;
            }
            self.storage().copy(&source, dest)?;
            debug!(service, source = %source.display(), "key volume copied");
        }
        Ok(())
    }

    fn process_volumes(
        &self,
        service: &str,
        conf: &Mapping,
        family: Option<&SoftwareFamily>,
        mounts: &mut Mounts,
        key_volumes: &mut Vec<(String, PathBuf)>,
    ) -> DnsbResult<Option<MainConf>> {
        let contents = self.layout().contents_dir(service);
        let mut main: Option<MainConf> = None;

        for raw in string_list(service, conf, "volumes")? {
            let spec = VolumeSpec::parse(&raw).map_err(|e| DnsbError::volume(service, e))?;
            let file_name = spec.file_name();
            let dest = contents.join(&file_name);
            let local = self.layout().mount_source(service, Path::new(&file_name));

            let copied = match &spec.source {
                VolumeSource::Resource(name) => {
                    let text = resources::embedded(name).ok_or_else(|| {
                        DnsbError::volume(service, format!("internal resource not found: {}", name))
                    })?;
                    self.storage().write_text(&dest, text)?;
                    true
                }
                VolumeSource::Key(relative) => {
                    key_volumes.push((relative.clone(), dest.clone()));
                    false
                }
                VolumeSource::Path(path) => self.copy_host_volume(service, path, &spec, &dest, mounts)?,
            };

            if !matches!(spec.source, VolumeSource::Path(_)) || copied {
                mounts.declared.push(spec.mount(&local));
            }

            if spec.is_conf() && copied {
                match main.as_mut() {
                    None => {
                        debug!(service, file = %file_name, "main config identified");
                        main = Some(MainConf {
                            text: self.storage().read_text(&dest)?,
                            path: dest,
                        });
                    }
                    Some(main) if main.text.contains(&spec.target) => {
                        debug!(service, target = %spec.target, "include already present");
                    }
                    Some(main) => {
                        if let Some(line) = family.and_then(|f| f.include_line(&spec.target)) {
                            main.text.push_str(&line);
                        }
                    }
                }
            }
        }
        Ok(main)
    }

    /// Copy a host volume into the service's contents; returns whether it
    /// was copied. Absolute paths outside the output root are mounted in
    /// place unless they are config files.
    fn copy_host_volume(
        &self,
        service: &str,
        path: &Path,
        spec: &VolumeSpec,
        dest: &Path,
        mounts: &mut Mounts,
    ) -> DnsbResult<bool> {
        let source = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        };
        let exists = self.storage().exists(&source);

        if path.is_absolute() {
            let generated = source.starts_with(self.layout().root());
            if !exists {
                warn!(service, source = %source.display(), "absolute volume source not found here; mounting in place");
                mounts.declared.push(spec.mount(&source.to_string_lossy()));
                return Ok(false);
            }
            if !generated && !spec.is_conf() {
                mounts.declared.push(spec.mount(&source.to_string_lossy()));
                return Ok(false);
            }
        } else if !exists {
            return Err(DnsbError::volume(
                service,
                format!("volume source not found: {}", source.display()),
            ));
        }

        self.storage().copy(&source, dest)?;
        Ok(true)
    }

    fn process_behavior(
        &self,
        service: &str,
        conf: &Mapping,
        family: Option<&SoftwareFamily>,
        main: Option<&mut MainConf>,
        mounts: &mut Mounts,
    ) -> DnsbResult<Vec<ZoneName>> {
        let script = match conf.get("behavior") {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::String(s)) if s.trim().is_empty() => return Ok(Vec::new()),
            Some(Value::String(s)) => s.as_str(),
            Some(_) => return Err(DnsbError::behavior(service, "'behavior' must be a string")),
        };
        let Some(main) = main else {
            return Err(DnsbError::behavior(
                service,
                "has 'behavior' but no main .conf file was found in its volumes",
            ));
        };
        let Some(family) = family else {
            return Err(DnsbError::behavior(
                service,
                "cannot process 'behavior': the service image has no software family",
            ));
        };
        if let SoftwareFamily::Other(software) = family {
            return Err(DnsbError::behavior(
                service,
                format!("cannot process 'behavior': software '{}' has no behavior support", software),
            ));
        }

        let statements = parse_script(script).map_err(|e| e.for_service(service))?;
        let rctx = RenderContext::new(service, family, &self.ctx.addresses);
        let mut server_lines = Vec::new();
        let mut top_lines = Vec::new();
        let mut zones: IndexMap<ZoneName, ZoneRecordSet> = IndexMap::new();

        for statement in &statements {
            debug!(service, line = statement.line, text = %statement.text, "rendering behavior");
            let artifact = render_behavior(&statement.behavior, &rctx)?;
            if !artifact.records.is_empty() {
                let zone = statement.behavior.zone().clone();
                zones
                    .entry(zone.clone())
                    .or_insert_with(|| ZoneRecordSet::new(zone))
                    .records
                    .extend(artifact.records);
            }
            if let Some(file) = artifact.file {
                let relative = Path::new(ZONES_DIR).join(&file.name);
                self.storage()
                    .write_text(&self.layout().zones_dir(service).join(&file.name), &file.content)?;
                mounts.generated.push(format!(
                    "{}:{}",
                    self.layout().mount_source(service, &relative),
                    file.container_path
                ));
            }
            if let Some(line) = artifact.config_line {
                match artifact.section {
                    ConfigSection::Server => server_lines.push(line),
                    ConfigSection::TopLevel => top_lines.push(line),
                }
            }
        }

        let mut signed_zones = Vec::new();
        for set in zones.values() {
            let output = self.generate_zone(service, conf, family, set)?;
            for artifact in &output.artifacts {
                let relative = Path::new(ZONES_DIR).join(&artifact.file_name);
                self.storage().write_text(
                    &self.layout().zones_dir(service).join(&artifact.file_name),
                    &artifact.content,
                )?;
                mounts.generated.push(format!(
                    "{}:{}",
                    self.layout().mount_source(service, &relative),
                    artifact.container_path
                ));
            }
            if let Some(primary) = output.primary() {
                if let Some(line) = master_config_line(family, &set.zone, &primary.container_path) {
                    top_lines.push(line);
                }
            }
            if self.persist_signing(service, &output)? {
                signed_zones.push(set.zone.clone());
            }
        }

        let content = format_sections(family, &server_lines, &top_lines);
        if content.trim().is_empty() {
            return Ok(signed_zones);
        }

        let container_path = format!("{}/{}", family.zones_dir(), GENERATED_CONF);
        self.storage().write_text(
            &self.layout().contents_dir(service).join(GENERATED_CONF),
            &format!("# Auto-generated by DNS Builder\n\n{}\n", content),
        )?;
        mounts.generated.push(format!(
            "{}:{}",
            self.layout().mount_source(service, Path::new(GENERATED_CONF)),
            container_path
        ));
        if let Some(line) = family.include_line(&container_path) {
            main.text.push_str(&line);
        }
        Ok(signed_zones)
    }

    fn dnssec_enabled(&self, conf: &Mapping) -> bool {
        self.dnssec
            .unwrap_or_else(|| conf.get("dnssec").and_then(Value::as_bool).unwrap_or(false))
    }

    fn generate_zone(
        &self,
        service: &str,
        conf: &Mapping,
        family: &SoftwareFamily,
        set: &ZoneRecordSet,
    ) -> DnsbResult<ZoneOutput> {
        let address: Ipv4Addr = *self.ctx.addresses.get(service).ok_or_else(|| {
            DnsbError::Build(format!(
                "service '{}' serves zone '{}' but has no address",
                service, set.zone
            ))
        })?;

        let mut generator = ZoneGenerator::new(self.names, self.serial);
        if self.dnssec_enabled(conf) {
            match self.signer {
                Some(signer) => generator = generator.with_signer(signer),
                None => warn!(service, zone = %set.zone, "DNSSEC requested but no signer is configured"),
            }
        }
        Ok(generator.generate(service, address, set, family.zones_dir()))
    }

    /// Write key material and zone copies for the trust-chain pass
    fn persist_signing(&self, service: &str, output: &ZoneOutput) -> DnsbResult<bool> {
        let Some(signed) = &output.signed else {
            return Ok(false);
        };
        let zone = &output.zone;
        let layout = self.layout();
        let storage = self.storage();

        storage.write_text(&layout.temp_unsigned(service, zone), &signed.unsigned)?;
        storage.write_text(&layout.temp_signed(service, zone), &signed.signed)?;
        for (role, key) in [(KeyRole::Zsk, &signed.zsk), (KeyRole::Ksk, &signed.ksk)] {
            storage.write_text(&layout.key_file(service, zone, role, "key"), &key.public_key)?;
            storage.write_text(&layout.key_file(service, zone, role, "private"), &key.private_key)?;
        }
        storage.write_text(&layout.ds_file(service, zone), &signed.ds_record)?;
        storage.write_text(
            &layout.meta_file(service, zone),
            &serde_json::to_string_pretty(&signed.material(zone, service))?,
        )?;
        debug!(service, zone = %zone, "key material persisted");
        Ok(true)
    }

    fn fragment(
        &self,
        service: &str,
        conf: &Mapping,
        image: Option<&Image>,
        volumes: Vec<String>,
    ) -> DnsbResult<Mapping> {
        let mut out = Mapping::new();
        out.insert(
            "container_name".into(),
            format!("{}-{}", self.ctx.project.name, service).into(),
        );
        out.insert("hostname".into(), service.into());
        match image {
            Some(image) if image.is_prebuilt() => {
                out.insert("image".into(), image.from.clone().into());
            }
            _ => {
                out.insert("build".into(), format!("./{}", service).into());
            }
        }

        if let Some(address) = self.ctx.addresses.get(service) {
            let mut attachment = Mapping::new();
            attachment.insert("ipv4_address".into(), address.to_string().into());
            let mut networks = Mapping::new();
            networks.insert(NETWORK_NAME.into(), Value::Mapping(attachment));
            out.insert("networks".into(), Value::Mapping(networks));
        }

        if !volumes.is_empty() {
            out.insert(
                "volumes".into(),
                Value::Sequence(volumes.into_iter().map(Value::from).collect()),
            );
        }

        let mut caps = string_list(service, conf, "cap_add")?;
        if caps.is_empty() {
            caps = DEFAULT_CAP_ADD.iter().map(|c| c.to_string()).collect();
        }
        out.insert(
            "cap_add".into(),
            Value::Sequence(caps.into_iter().map(Value::from).collect()),
        );

        for (key, value) in conf {
            let reserved = key.as_str().is_some_and(|k| RESERVED_KEYS.contains(&k));
            if !reserved && !out.contains_key(key) {
                out.insert(key.clone(), value.clone());
            }
        }
        Ok(out)
    }
}

/// Group rendered lines into the generated config file
fn format_sections(family: &SoftwareFamily, server: &[String], top: &[String]) -> String {
    match family {
        SoftwareFamily::Unbound => {
            let mut content = String::new();
            if !server.is_empty() {
                content.push_str("server:\n");
                for line in server {
                    for sub in line.lines() {
                        content.push('\t');
                        content.push_str(sub);
                        content.push('\n');
                    }
                }
            }
            if !top.is_empty() {
                content.push('\n');
                content.push_str(&top.join("\n\n"));
            }
            content
        }
        _ => server
            .iter()
            .chain(top)
            .cloned()
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn push_block(text: &mut String, block: &str) {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
    text.push_str(block);
    if !block.ends_with('\n') {
        text.push('\n');
    }
}

fn string_list(service: &str, conf: &Mapping, key: &str) -> DnsbResult<Vec<String>> {
    match conf.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Sequence(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                _ => Err(DnsbError::BuildDefinition(format!(
                    "'{}' of service '{}' must contain only strings",
                    key, service
                ))),
            })
            .collect(),
        Some(_) => Err(DnsbError::BuildDefinition(format!(
            "'{}' of service '{}' must be a list",
            key, service
        ))),
    }
}
