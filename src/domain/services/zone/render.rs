//! Zone file text

use crate::domain::entities::{RecordType, ResourceRecord, ZoneRecordSet};
use crate::domain::value_objects::ZoneName;

const MIN_OWNER_WIDTH: usize = 24;
const COLUMN_WIDTH: usize = 8;

pub const SOA_TTL: u32 = 86400;
pub const DEFAULT_TTL: u32 = 3600;
const SOA_TIMERS: &str = "7200 3600 1209600 3600";

/// SOA, NS and the NS target's address, prepended to every zone
pub fn default_records(zone: &ZoneName, ns_target: &str, address: &str, serial: u32) -> Vec<ResourceRecord> {
    let rname = zone.qualify("admin");
    vec![
        ResourceRecord::new(
            zone.origin(),
            RecordType::Soa,
            format!("{} {} {} {}", ns_target, rname, serial, SOA_TIMERS),
        )
        .with_ttl(Some(SOA_TTL)),
        ResourceRecord::new(zone.origin(), RecordType::Ns, ns_target).with_ttl(Some(DEFAULT_TTL)),
        ResourceRecord::new(ns_target, RecordType::A, address).with_ttl(Some(DEFAULT_TTL)),
    ]
}

/// Render a record set with aligned columns
pub fn render_zone(set: &ZoneRecordSet) -> String {
    let owners: Vec<String> = set
        .records
        .iter()
        .map(|r| set.zone.relativize(&r.owner))
        .collect();
    let width = owners
        .iter()
        .map(|o| o.len() + 1)
        .max()
        .unwrap_or(0)
        .max(MIN_OWNER_WIDTH);

    let mut out = format!("$ORIGIN {}\n", set.zone.origin());
    for (owner, record) in owners.iter().zip(&set.records) {
        let ttl = record.ttl.map(|t| t.to_string()).unwrap_or_default();
        out.push_str(&format!(
            "{:<width$}{:<col$}{:<col$}{:<col$}{}\n",
            owner,
            ttl,
            "IN",
            record.rtype.as_str(),
            record.rdata,
            width = width,
            col = COLUMN_WIDTH
        ));
    }
    out
}
