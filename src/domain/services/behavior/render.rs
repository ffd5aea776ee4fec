//! Behavior rendering
//!
//! Dispatch is on two axes: the closed set of behavior kinds and the
//! software family. Unsupported pairs are reported as not implemented.

use std::net::{IpAddr, Ipv4Addr};

use indexmap::IndexMap;

use crate::domain::entities::{Behavior, BehaviorArtifact, BehaviorKind, ConfigSection, GeneratedFile};
use crate::domain::services::behavior::records::synthesize_records;
use crate::domain::value_objects::{SoftwareFamily, TargetRef, ZoneName};
use crate::error::{DnsbError, DnsbResult};

/// What a behavior needs to know about the service rendering it
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub service: &'a str,
    pub family: &'a SoftwareFamily,
    pub addresses: &'a IndexMap<String, Ipv4Addr>,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        service: &'a str,
        family: &'a SoftwareFamily,
        addresses: &'a IndexMap<String, Ipv4Addr>,
    ) -> Self {
        Self {
            service,
            family,
            addresses,
        }
    }

    /// Address of a declared service
    pub fn service_address(&self, name: &str) -> Option<Ipv4Addr> {
        self.addresses.get(name).copied()
    }

    /// Literal addresses pass through, service names go through the plan
    pub fn resolve_targets(&self, behavior: &Behavior) -> DnsbResult<Vec<IpAddr>> {
        behavior
            .targets()
            .into_iter()
            .map(|target| match TargetRef::classify(target) {
                TargetRef::Address(addr) => Ok(addr),
                TargetRef::Name(name) => self
                    .service_address(&name)
                    .map(IpAddr::V4)
                    .ok_or_else(|| {
                        DnsbError::behavior(
                            self.service,
                            format!(
                                "'{}' statement for zone '{}' references an undefined service or invalid IP: '{}'",
                                behavior.kind(),
                                behavior.zone(),
                                name
                            ),
                        )
                    }),
            })
            .collect()
    }
}

fn supports(family: &SoftwareFamily, kind: BehaviorKind) -> bool {
    matches!(
        (family, kind),
        (SoftwareFamily::Bind, _)
            | (
                SoftwareFamily::Unbound,
                BehaviorKind::Forward | BehaviorKind::Stub | BehaviorKind::Hint | BehaviorKind::Master
            )
    )
}

/// Render one statement for the context's software family
pub fn render_behavior(behavior: &Behavior, ctx: &RenderContext<'_>) -> DnsbResult<BehaviorArtifact> {
    if !supports(ctx.family, behavior.kind()) {
        return Err(DnsbError::UnsupportedFeature(format!(
            "behavior '{}' is not implemented for software '{}'",
            behavior.kind(),
            ctx.family
        )));
    }

    if let Behavior::Master { zone, record } = behavior {
        let records = synthesize_records(zone, record, ctx)?;
        return Ok(BehaviorArtifact {
            records,
            ..BehaviorArtifact::default()
        });
    }

    let ips = ctx.resolve_targets(behavior)?;
    let zone = behavior.zone().config_name();

    Ok(match (behavior, ctx.family) {
        (Behavior::Forward { .. }, SoftwareFamily::Unbound) => BehaviorArtifact::line(
            unbound_block("forward-zone", "forward-addr", zone, &ips),
            ConfigSection::TopLevel,
        ),
        (Behavior::Stub { .. }, SoftwareFamily::Unbound) => BehaviorArtifact::line(
            unbound_block("stub-zone", "stub-addr", zone, &ips),
            ConfigSection::TopLevel,
        ),
        (Behavior::Forward { .. }, _) => BehaviorArtifact::line(
            format!(
                "zone \"{}\" {{ type forward; forwarders {{ {} }}; }};",
                zone,
                bind_list(&ips)
            ),
            ConfigSection::TopLevel,
        ),
        (Behavior::Stub { .. }, _) => BehaviorArtifact::line(
            format!(
                "zone \"{}\" {{ type stub; masters {{ {} }}; }};",
                zone,
                bind_list(&ips)
            ),
            ConfigSection::TopLevel,
        ),
        (Behavior::Hint { target, .. }, family) => {
            let file = root_hints(ctx.service, family, target, &ips);
            let artifact = match family {
                SoftwareFamily::Unbound => BehaviorArtifact::line(
                    format!("root-hints: \"{}\"", file.container_path),
                    ConfigSection::Server,
                ),
                _ => BehaviorArtifact::line(
                    format!(
                        "zone \"{}\" {{ type hint; file \"{}\"; }};",
                        zone, file.container_path
                    ),
                    ConfigSection::TopLevel,
                ),
            };
            artifact.with_file(file)
        }
        (Behavior::Master { .. }, _) => BehaviorArtifact::default(),
    })
}

/// Config line loading an aggregated zone file
pub fn master_config_line(family: &SoftwareFamily, zone: &ZoneName, container_path: &str) -> Option<String> {
    match family {
        SoftwareFamily::Bind => Some(format!(
            "zone \"{}\" {{ type master; file \"{}\"; }};",
            zone.config_name(),
            container_path
        )),
        SoftwareFamily::Unbound => Some(format!(
            "auth-zone:\n\tname: \"{}\"\n\tzonefile: \"{}\"",
            zone.config_name(),
            container_path
        )),
        SoftwareFamily::Other(_) => None,
    }
}

fn bind_list(ips: &[IpAddr]) -> String {
    ips.iter()
        .map(|ip| format!("{};", ip))
        .collect::<Vec<_>>()
        .join(" ")
}

fn unbound_block(block: &str, key: &str, zone: &str, ips: &[IpAddr]) -> String {
    let addrs = ips
        .iter()
        .map(|ip| format!("{}: {}", key, ip))
        .collect::<Vec<_>>()
        .join("\n\t");
    format!("{}:\n\tname: \"{}\"\n\t{}", block, zone, addrs)
}

fn root_hints(service: &str, family: &SoftwareFamily, target: &str, ips: &[IpAddr]) -> GeneratedFile {
    let name = format!("gen_{}_root.hints", service);
    let ip = ips.first().map(ToString::to_string).unwrap_or_default();
    let target = target.trim_end_matches('.');
    GeneratedFile {
        container_path: format!("{}/{}", family.zones_dir(), name),
        content: format!(
            ".\t3600000\tIN\tNS\t{t}.\n{t}.\t3600000\tIN\tA\t{ip}\n",
            t = target,
            ip = ip
        ),
        name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::services::behavior::parse_behavior;

    fn addresses() -> IndexMap<String, Ipv4Addr> {
        let mut map = IndexMap::new();
        map.insert("root-server".to_string(), Ipv4Addr::new(198, 51, 100, 1));
        map.insert("tld".to_string(), Ipv4Addr::new(10, 88, 0, 3));
        map
    }

    fn render(line: &str, family: SoftwareFamily) -> DnsbResult<BehaviorArtifact> {
        let addresses = addresses();
        let ctx = RenderContext::new("resolver", &family, &addresses);
        render_behavior(&parse_behavior(line).unwrap(), &ctx)
    }

    #[test]
    fn hint_generates_root_hints_file() {
        let artifact = render(". hint root-server", SoftwareFamily::Bind).unwrap();
        let file = artifact.file.unwrap();
        assert_eq!(file.name, "gen_resolver_root.hints");
        assert_eq!(file.container_path, "/usr/local/etc/zones/gen_resolver_root.hints");
        assert!(file.content.contains(".\t3600000\tIN\tNS\troot-server.\n"));
        assert!(file
            .content
            .contains("root-server.\t3600000\tIN\tA\t198.51.100.1\n"));
        assert_eq!(
            artifact.config_line.as_deref(),
            Some("zone \".\" { type hint; file \"/usr/local/etc/zones/gen_resolver_root.hints\"; };")
        );
        assert_eq!(artifact.section, ConfigSection::TopLevel);
    }

    #[test]
    fn unbound_hint_is_a_server_option() {
        let artifact = render(". hint root-server", SoftwareFamily::Unbound).unwrap();
        assert_eq!(artifact.section, ConfigSection::Server);
        assert_eq!(
            artifact.config_line.as_deref(),
            Some("root-hints: \"/usr/local/etc/unbound/zones/gen_resolver_root.hints\"")
        );
    }

    #[test]
    fn bind_forward_and_stub() {
        let forward = render("com forward tld,192.0.2.53", SoftwareFamily::Bind).unwrap();
        assert_eq!(
            forward.config_line.as_deref(),
            Some("zone \"com\" { type forward; forwarders { 10.88.0.3; 192.0.2.53; }; };")
        );
        let stub = render("com stub tld", SoftwareFamily::Bind).unwrap();
        assert_eq!(
            stub.config_line.as_deref(),
            Some("zone \"com\" { type stub; masters { 10.88.0.3; }; };")
        );
    }

    #[test]
    fn unbound_forward_and_stub_blocks() {
        let forward = render(". forward tld,192.0.2.53", SoftwareFamily::Unbound).unwrap();
        assert_eq!(
            forward.config_line.as_deref(),
            Some("forward-zone:\n\tname: \".\"\n\tforward-addr: 10.88.0.3\n\tforward-addr: 192.0.2.53")
        );
        let stub = render("com stub tld", SoftwareFamily::Unbound).unwrap();
        assert_eq!(
            stub.config_line.as_deref(),
            Some("stub-zone:\n\tname: \"com\"\n\tstub-addr: 10.88.0.3")
        );
    }

    #[test]
    fn unknown_service_target_is_a_behavior_error() {
        let err = render("com forward ghost", SoftwareFamily::Bind).unwrap_err();
        match err {
            DnsbError::Behavior { service, message } => {
                assert_eq!(service, "resolver");
                assert!(message.contains("'ghost'"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn other_families_are_not_implemented() {
        let err = render("com forward tld", SoftwareFamily::from_software("powerdns")).unwrap_err();
        assert!(matches!(err, DnsbError::UnsupportedFeature(_)));
        let msg = err.to_string();
        assert!(msg.contains("not implemented"));
        assert!(msg.contains("powerdns"));
        assert!(msg.contains("forward"));
    }

    #[test]
    fn master_renders_records_only() {
        let artifact = render("com master www A tld", SoftwareFamily::Bind).unwrap();
        assert!(artifact.config_line.is_none());
        assert_eq!(artifact.records.len(), 1);
    }

    #[test]
    fn master_config_lines_per_family() {
        let zone = ZoneName::new("com");
        assert_eq!(
            master_config_line(&SoftwareFamily::Bind, &zone, "/usr/local/etc/zones/db.com").unwrap(),
            "zone \"com\" { type master; file \"/usr/local/etc/zones/db.com\"; };"
        );
        assert_eq!(
            master_config_line(&SoftwareFamily::Unbound, &ZoneName::root(), "/z/db.root").unwrap(),
            "auth-zone:\n\tname: \".\"\n\tzonefile: \"/z/db.root\""
        );
    }
}
