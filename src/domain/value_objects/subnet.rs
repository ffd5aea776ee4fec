//! IPv4 subnet value object

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubnetError {
    #[error("'{0}' is not in CIDR notation (expected a.b.c.d/prefix)")]
    Format(String),
    #[error("'{0}' is not a valid IPv4 address")]
    Address(String),
    #[error("prefix length '{0}' must be between 0 and 32")]
    Prefix(String),
    #[error("'{0}' has host bits set")]
    HostBits(String),
}

/// An IPv4 network in CIDR notation
///
/// Parsing is strict: `10.0.0.1/24` is rejected because host bits are set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subnet {
    network: Ipv4Addr,
    prefix: u8,
}

impl Subnet {
    pub fn network(&self) -> Ipv4Addr {
        self.network
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    fn mask(&self) -> u32 {
        mask_for(self.prefix)
    }

    fn first(&self) -> u32 {
        u32::from(self.network)
    }

    fn last(&self) -> u32 {
        self.first() | !self.mask()
    }

    /// Whether `addr` lies inside this network
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        u32::from(addr) & self.mask() == self.first()
    }

    /// Addresses a container may be given.
    ///
    /// The network address and the gateway (network + 1) are reserved; every
    /// later address up to the end of the range is handed out in order.
    pub fn allocatable(&self) -> impl Iterator<Item = Ipv4Addr> {
        let start = self.first().saturating_add(2);
        let end = self.last();
        let range = if self.prefix >= 31 { 1..=0 } else { start..=end };
        range.map(Ipv4Addr::from)
    }
}

fn mask_for(prefix: u8) -> u32 {
    if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(prefix))
    }
}

impl FromStr for Subnet {
    type Err = SubnetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (addr, prefix) = s
            .split_once('/')
            .ok_or_else(|| SubnetError::Format(s.to_string()))?;
        let addr: Ipv4Addr = addr
            .parse()
            .map_err(|_| SubnetError::Address(addr.to_string()))?;
        let prefix: u8 = prefix
            .parse()
            .ok()
            .filter(|p| *p <= 32)
            .ok_or_else(|| SubnetError::Prefix(prefix.to_string()))?;

        if u32::from(addr) & !mask_for(prefix) != 0 {
            return Err(SubnetError::HostBits(s.to_string()));
        }

        Ok(Self {
            network: addr,
            prefix,
        })
    }
}

impl fmt::Display for Subnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix)
    }
}
