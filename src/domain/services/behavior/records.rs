//! Resource records synthesized from `master` statements

use std::net::IpAddr;

use crate::domain::entities::{Behavior, MasterRecord, RecordType, ResourceRecord};
use crate::domain::services::behavior::render::RenderContext;
use crate::domain::value_objects::ZoneName;
use crate::error::{DnsbError, DnsbResult};

/// Records contributed to `zone` by one master statement.
///
/// NS targets that are declared services get a glue address record under
/// `ns<k>.<owner>`; anything else is an external delegation without glue.
pub fn synthesize_records(
    zone: &ZoneName,
    record: &MasterRecord,
    ctx: &RenderContext<'_>,
) -> DnsbResult<Vec<ResourceRecord>> {
    let owner = zone.qualify(&record.name);
    let rr = |owner: &str, rtype: RecordType, rdata: String| {
        ResourceRecord::new(owner, rtype, rdata).with_ttl(record.ttl)
    };

    let records = match record.rtype {
        RecordType::A | RecordType::Aaaa => {
            let behavior = Behavior::Master {
                zone: zone.clone(),
                record: record.clone(),
            };
            let mut out = Vec::new();
            for ip in ctx.resolve_targets(&behavior)? {
                let family_matches = matches!(
                    (record.rtype, ip),
                    (RecordType::A, IpAddr::V4(_)) | (RecordType::Aaaa, IpAddr::V6(_))
                );
                if !family_matches {
                    return Err(DnsbError::behavior(
                        ctx.service,
                        format!(
                            "{} record '{}' in zone '{}' cannot hold address {}",
                            record.rtype.as_str(),
                            owner,
                            zone,
                            ip
                        ),
                    ));
                }
                out.push(rr(&owner, record.rtype, ip.to_string()));
            }
            out
        }
        RecordType::Ns => {
            let mut out = Vec::new();
            for (idx, target) in record.targets.iter().enumerate() {
                match ctx.service_address(target) {
                    Some(ip) => {
                        let glue = if owner == "." {
                            format!("ns{}.", idx + 1)
                        } else {
                            format!("ns{}.{}", idx + 1, owner)
                        };
                        out.push(rr(&owner, RecordType::Ns, glue.clone()));
                        out.push(rr(&glue, RecordType::A, ip.to_string()));
                    }
                    None => out.push(rr(&owner, RecordType::Ns, zone.qualify(target))),
                }
            }
            out
        }
        RecordType::Cname => record
            .targets
            .iter()
            .map(|target| rr(&owner, RecordType::Cname, zone.qualify(target)))
            .collect(),
        RecordType::Txt => {
            let data = record
                .targets
                .iter()
                .map(|t| format!("\"{}\"", t.replace('"', "\\\"")))
                .collect::<Vec<_>>()
                .join(" ");
            vec![rr(&owner, RecordType::Txt, data)]
        }
        other => vec![rr(&owner, other, record.targets.join(" "))],
    };
    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use indexmap::IndexMap;

    use super::*;
    use crate::domain::services::behavior::parse_behavior;
    use crate::domain::value_objects::SoftwareFamily;

    fn synth(line: &str) -> Vec<(String, Option<u32>, &'static str, String)> {
        let mut addresses = IndexMap::new();
        addresses.insert("sld".to_string(), Ipv4Addr::new(10, 88, 0, 4));
        addresses.insert("root".to_string(), Ipv4Addr::new(10, 88, 0, 2));
        let family = SoftwareFamily::Bind;
        let ctx = RenderContext::new("tld", &family, &addresses);
        let Behavior::Master { zone, record } = parse_behavior(line).unwrap() else {
            panic!("expected master statement");
        };
        synthesize_records(&zone, &record, &ctx)
            .unwrap()
            .into_iter()
            .map(|r| (r.owner, r.ttl, r.rtype.as_str(), r.rdata))
            .collect()
    }

    #[test]
    fn address_records_resolve_services_and_literals() {
        assert_eq!(
            synth("com master www A 600 sld,192.0.2.1"),
            vec![
                ("www.com.".into(), Some(600), "A", "10.88.0.4".into()),
                ("www.com.".into(), Some(600), "A", "192.0.2.1".into()),
            ]
        );
    }

    #[test]
    fn address_family_must_match_record_type() {
        let synth_err = |line: &str| {
            let mut addresses = IndexMap::new();
            addresses.insert("sld".to_string(), Ipv4Addr::new(10, 88, 0, 4));
            let family = SoftwareFamily::Bind;
            let ctx = RenderContext::new("tld", &family, &addresses);
            let Behavior::Master { zone, record } = parse_behavior(line).unwrap() else {
                panic!("expected master statement");
            };
            synthesize_records(&zone, &record, &ctx).unwrap_err()
        };

        let err = synth_err("com master www AAAA sld");
        assert!(matches!(err, DnsbError::Behavior { .. }));
        assert!(err.to_string().contains("10.88.0.4"));

        let err = synth_err("com master www A 2001:db8::1");
        assert!(matches!(err, DnsbError::Behavior { .. }));

        assert_eq!(
            synth("com master www AAAA 2001:db8::1"),
            vec![("www.com.".into(), None, "AAAA", "2001:db8::1".into())]
        );
    }

    #[test]
    fn ns_to_service_gets_glue_and_external_does_not() {
        assert_eq!(
            synth("com master example NS sld,ns.provider.net."),
            vec![
                ("example.com.".into(), None, "NS", "ns1.example.com.".into()),
                ("ns1.example.com.".into(), None, "A", "10.88.0.4".into()),
                ("example.com.".into(), None, "NS", "ns.provider.net.".into()),
            ]
        );
    }

    #[test]
    fn ns_glue_under_root_apex() {
        assert_eq!(
            synth(". master @ NS root"),
            vec![
                (".".into(), None, "NS", "ns1.".into()),
                ("ns1.".into(), None, "A", "10.88.0.2".into()),
            ]
        );
    }

    #[test]
    fn cname_txt_and_literal_types() {
        assert_eq!(
            synth("com master alias CNAME www"),
            vec![("alias.com.".into(), None, "CNAME", "www.com.".into())]
        );
        assert_eq!(
            synth("com master @ TXT v=spf1 -all,hello"),
            vec![("com.".into(), None, "TXT", "\"v=spf1 -all\" \"hello\"".into())]
        );
        assert_eq!(
            synth("com master @ MX 3600 10 mail.com."),
            vec![("com.".into(), Some(3600), "MX", "10 mail.com.".into())]
        );
    }
}
