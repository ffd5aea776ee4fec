//! Deployment manifest
//!
//! One compose document per build: every buildable service's fragment in
//! declaration order plus the shared bridge network on the project subnet.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml_ng::Mapping;

use crate::application::build::service::NETWORK_NAME;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,
    pub services: IndexMap<String, Mapping>,
    pub networks: IndexMap<String, NetworkDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDefinition {
    pub driver: String,
    pub ipam: Ipam,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ipam {
    pub config: Vec<IpamPool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpamPool {
    pub subnet: String,
}

impl Manifest {
    pub fn new(name: impl Into<String>, subnet: impl Into<String>) -> Self {
        let mut networks = IndexMap::new();
        networks.insert(
            NETWORK_NAME.to_string(),
            NetworkDefinition {
                driver: "bridge".to_string(),
                ipam: Ipam {
                    config: vec![IpamPool {
                        subnet: subnet.into(),
                    }],
                },
            },
        );
        Self {
            name: name.into(),
            services: IndexMap::new(),
            networks,
        }
    }

    pub fn with_service(mut self, name: impl Into<String>, fragment: Mapping) -> Self {
        self.services.insert(name.into(), fragment);
        self
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml_ng::Error> {
        serde_yaml_ng::to_string(self)
    }
}
