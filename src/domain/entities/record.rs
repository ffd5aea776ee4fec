//! DNS resource records

use std::fmt;
use std::str::FromStr;

use crate::domain::value_objects::ZoneName;

/// Record types the behavior language can emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    Soa,
    Ns,
    A,
    Aaaa,
    Cname,
    Txt,
    Mx,
    Ptr,
    Srv,
    Caa,
    Ds,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Soa => "SOA",
            RecordType::Ns => "NS",
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Cname => "CNAME",
            RecordType::Txt => "TXT",
            RecordType::Mx => "MX",
            RecordType::Ptr => "PTR",
            RecordType::Srv => "SRV",
            RecordType::Caa => "CAA",
            RecordType::Ds => "DS",
        }
    }
}

impl FromStr for RecordType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_uppercase().as_str() {
            "SOA" => RecordType::Soa,
            "NS" => RecordType::Ns,
            "A" => RecordType::A,
            "AAAA" => RecordType::Aaaa,
            "CNAME" => RecordType::Cname,
            "TXT" => RecordType::Txt,
            "MX" => RecordType::Mx,
            "PTR" => RecordType::Ptr,
            "SRV" => RecordType::Srv,
            "CAA" => RecordType::Caa,
            "DS" => RecordType::Ds,
            other => return Err(other.to_string()),
        })
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One record; `owner` is always absolute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    pub owner: String,
    pub ttl: Option<u32>,
    pub rtype: RecordType,
    pub rdata: String,
}

impl ResourceRecord {
    pub fn new(owner: impl Into<String>, rtype: RecordType, rdata: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            ttl: None,
            rtype,
            rdata: rdata.into(),
        }
    }

    pub fn with_ttl(mut self, ttl: Option<u32>) -> Self {
        self.ttl = ttl;
        self
    }
}

/// All records one service publishes for one zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneRecordSet {
    pub zone: ZoneName,
    pub records: Vec<ResourceRecord>,
}

impl ZoneRecordSet {
    pub fn new(zone: ZoneName) -> Self {
        Self {
            zone,
            records: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_type_parse_is_case_insensitive() {
        assert_eq!("aaaa".parse::<RecordType>(), Ok(RecordType::Aaaa));
        assert_eq!("Ns".parse::<RecordType>(), Ok(RecordType::Ns));
        assert_eq!("HINFO".parse::<RecordType>(), Err("HINFO".to_string()));
    }
}
