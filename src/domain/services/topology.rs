//! Service topology
//!
//! A read-only view of which service talks to which, derived from behavior
//! targets. It feeds diagnostics and the optional DOT export and never
//! influences generated artifacts.

use std::fmt;

use serde_yaml_ng::Value;
use tracing::warn;

use crate::domain::entities::{Behavior, BehaviorKind, RecordType, ServiceMap};
use crate::domain::services::behavior::parse_script;
use crate::domain::services::network_planner::is_buildable;
use crate::domain::value_objects::TargetRef;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyEdge {
    pub from: String,
    pub to: String,
    pub kind: BehaviorKind,
    pub zone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Topology {
    pub services: Vec<String>,
    pub edges: Vec<TopologyEdge>,
}

impl Topology {
    pub fn from_services(services: &ServiceMap) -> Self {
        let mut topology = Topology {
            services: services
                .iter()
                .filter(|(_, conf)| is_buildable(conf))
                .map(|(name, _)| name.clone())
                .collect(),
            edges: Vec::new(),
        };

        for (name, conf) in services {
            let Some(script) = conf.get("behavior").and_then(Value::as_str) else {
                continue;
            };
            // Malformed scripts are reported by artifact generation.
            let Ok(statements) = parse_script(script) else {
                continue;
            };
            for statement in statements {
                for target in service_targets(&statement.behavior) {
                    if !services.contains_key(target) {
                        warn!(service = %name, target, "behavior target is not a declared service");
                        continue;
                    }
                    let edge = TopologyEdge {
                        from: name.clone(),
                        to: target.to_string(),
                        kind: statement.behavior.kind(),
                        zone: statement.behavior.zone().origin().to_string(),
                    };
                    if !topology.edges.contains(&edge) {
                        topology.edges.push(edge);
                    }
                }
            }
        }
        topology
    }

    /// Services `name` depends on
    pub fn dependencies_of<'t>(&'t self, name: &'t str) -> impl Iterator<Item = &'t str> + 't {
        self.edges
            .iter()
            .filter(move |e| e.from == name)
            .map(|e| e.to.as_str())
    }

    /// Graphviz rendition
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph dnsbuilder {\n    rankdir=LR;\n");
        for service in &self.services {
            out.push_str(&format!("    \"{}\";\n", service));
        }
        for edge in &self.edges {
            out.push_str(&format!(
                "    \"{}\" -> \"{}\" [label=\"{} {}\"];\n",
                edge.from, edge.to, edge.kind, edge.zone
            ));
        }
        out.push_str("}\n");
        out
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for edge in &self.edges {
            writeln!(f, "{} -> {} ({} {})", edge.from, edge.to, edge.kind, edge.zone)?;
        }
        Ok(())
    }
}

/// Targets that name services. Only address-bearing master records point
/// at other services; TXT and CNAME data are literals.
fn service_targets(behavior: &Behavior) -> Vec<&str> {
    if let Behavior::Master { record, .. } = behavior {
        if !matches!(record.rtype, RecordType::A | RecordType::Aaaa | RecordType::Ns) {
            return Vec::new();
        }
        if record.rtype == RecordType::Ns {
            return record
                .targets
                .iter()
                .map(String::as_str)
                .filter(|t| !t.ends_with('.'))
                .collect();
        }
    }
    behavior
        .targets()
        .into_iter()
        .filter(|t| matches!(TargetRef::classify(t), TargetRef::Name(_)))
        .collect()
}
