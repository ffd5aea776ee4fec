//! Behavior target classification

use std::net::IpAddr;

/// A behavior target is either a literal address or a service name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetRef {
    Address(IpAddr),
    Name(String),
}

impl TargetRef {
    pub fn classify(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.parse::<IpAddr>() {
            Ok(addr) => TargetRef::Address(addr),
            Err(_) => TargetRef::Name(raw.to_string()),
        }
    }
}
