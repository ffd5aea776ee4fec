//! Behavior statements
//!
//! A behavior is one line of a service's behavior script, parsed into a
//! closed set of kinds.

use std::fmt;

use crate::domain::entities::RecordType;
use crate::domain::value_objects::ZoneName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BehaviorKind {
    Forward,
    Stub,
    Hint,
    Master,
}

impl BehaviorKind {
    pub fn parse(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "forward" => Some(BehaviorKind::Forward),
            "stub" => Some(BehaviorKind::Stub),
            "hint" => Some(BehaviorKind::Hint),
            "master" => Some(BehaviorKind::Master),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BehaviorKind::Forward => "forward",
            BehaviorKind::Stub => "stub",
            BehaviorKind::Hint => "hint",
            BehaviorKind::Master => "master",
        }
    }
}

impl fmt::Display for BehaviorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record declared by a `master` statement, before target resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterRecord {
    /// Record name as written (`@`, relative, or absolute)
    pub name: String,
    pub rtype: RecordType,
    pub ttl: Option<u32>,
    pub targets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Behavior {
    Forward { zone: ZoneName, targets: Vec<String> },
    Stub { zone: ZoneName, targets: Vec<String> },
    Hint { zone: ZoneName, target: String },
    Master { zone: ZoneName, record: MasterRecord },
}

impl Behavior {
    pub fn kind(&self) -> BehaviorKind {
        match self {
            Behavior::Forward { .. } => BehaviorKind::Forward,
            Behavior::Stub { .. } => BehaviorKind::Stub,
            Behavior::Hint { .. } => BehaviorKind::Hint,
            Behavior::Master { .. } => BehaviorKind::Master,
        }
    }

    pub fn zone(&self) -> &ZoneName {
        match self {
            Behavior::Forward { zone, .. }
            | Behavior::Stub { zone, .. }
            | Behavior::Hint { zone, .. }
            | Behavior::Master { zone, .. } => zone,
        }
    }

    pub fn targets(&self) -> Vec<&str> {
        match self {
            Behavior::Forward { targets, .. } | Behavior::Stub { targets, .. } => {
                targets.iter().map(String::as_str).collect()
            }
            Behavior::Hint { target, .. } => vec![target.as_str()],
            Behavior::Master { record, .. } => record.targets.iter().map(String::as_str).collect(),
        }
    }
}
