//! Network planner
//!
//! Assigns every buildable service an IPv4 address inside the project
//! subnet. Static `address` keys are claimed first, then the remaining
//! services take the lowest free allocatable address in declaration order.

use std::collections::{HashMap, HashSet};
use std::net::Ipv4Addr;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde_yaml_ng::{Mapping, Value};
use tracing::debug;

use crate::domain::entities::ServiceMap;
use crate::domain::value_objects::Subnet;
use crate::error::{DnsbError, DnsbResult};

/// A service becomes a container when it has an image and `build` is not false
pub fn is_buildable(conf: &Mapping) -> bool {
    conf.contains_key("image") && conf.get("build").and_then(Value::as_bool) != Some(false)
}

#[derive(Debug, Clone)]
pub struct NetworkPlanner {
    subnet: Subnet,
    source: PathBuf,
}

impl NetworkPlanner {
    pub fn new(subnet: Subnet) -> Self {
        Self {
            subnet,
            source: PathBuf::from("<testbed>"),
        }
    }

    /// Testbed file named by static address conflicts
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = source.into();
        self
    }

    pub fn subnet(&self) -> Subnet {
        self.subnet
    }

    /// Service name -> address, in service declaration order
    pub fn plan(&self, services: &ServiceMap) -> DnsbResult<IndexMap<String, Ipv4Addr>> {
        let mut claimed: HashSet<Ipv4Addr> = HashSet::new();
        let mut statics: HashMap<&str, Ipv4Addr> = HashMap::new();

        for (name, conf) in services.iter().filter(|(_, conf)| is_buildable(conf)) {
            let Some(addr) = self.static_address(name, conf)? else {
                continue;
            };
            if !claimed.insert(addr) {
                return Err(self.conflict(format!(
                    "address {} of service '{}' is already assigned to another service",
                    addr, name
                )));
            }
            statics.insert(name.as_str(), addr);
        }

        let mut free = self.subnet.allocatable().filter(|a| !claimed.contains(a));
        let mut plan = IndexMap::new();
        for (name, _) in services.iter().filter(|(_, conf)| is_buildable(conf)) {
            let addr = match statics.get(name.as_str()) {
                Some(addr) => *addr,
                None => free.next().ok_or_else(|| {
                    DnsbError::Build(format!(
                        "Subnet {} is out of available IP addresses",
                        self.subnet
                    ))
                })?,
            };
            debug!(service = %name, address = %addr, "address assigned");
            plan.insert(name.clone(), addr);
        }
        Ok(plan)
    }

    fn static_address(&self, name: &str, conf: &Mapping) -> DnsbResult<Option<Ipv4Addr>> {
        let raw = match conf.get("address") {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::String(s)) => s.trim(),
            Some(_) => {
                return Err(DnsbError::NetworkDefinition(format!(
                    "address of service '{}' must be a string",
                    name
                )))
            }
        };
        let addr: Ipv4Addr = raw.parse().map_err(|_| {
            DnsbError::NetworkDefinition(format!(
                "service '{}' declares an invalid IPv4 address '{}'",
                name, raw
            ))
        })?;
        if !self.subnet.contains(addr) {
            return Err(self.conflict(format!(
                "address {} of service '{}' is outside subnet {}",
                addr, name, self.subnet
            )));
        }
        Ok(Some(addr))
    }

    fn conflict(&self, message: String) -> DnsbError {
        DnsbError::Config {
            file: self.source.clone(),
            message,
        }
    }
}
