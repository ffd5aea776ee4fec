//! Name server pseudo-host naming
//!
//! Each authoritative service gets a stable NS label per zone depth: the
//! first service seen at a depth is `ns`, the next ones `a`, `b`, ... and
//! past `z` the label falls back to `ns<n>`. The registry is owned by one
//! build, so parallel builds never share counters.

use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct NameServerRegistry {
    labels: Mutex<HashMap<usize, Vec<String>>>,
}

impl NameServerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Label for `service` at `depth`, assigned on first use
    pub fn label(&self, depth: usize, service: &str) -> String {
        let mut labels = self
            .labels
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let seen = labels.entry(depth).or_default();
        let index = match seen.iter().position(|s| s == service) {
            Some(index) => index,
            None => {
                seen.push(service.to_string());
                seen.len() - 1
            }
        };
        label_for(index)
    }
}

fn label_for(index: usize) -> String {
    match index {
        0 => "ns".to_string(),
        1..=26 => char::from(b'a' + (index - 1) as u8).to_string(),
        n => format!("ns{}", n),
    }
}
