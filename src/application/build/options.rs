//! Build Options

use std::path::PathBuf;

/// Options for the build use case
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Output root; wiped at the start of every build
    pub output: PathBuf,
    /// Directory relative volume sources resolve against
    pub base_dir: PathBuf,
    /// Worker threads for per-service phases
    pub jobs: usize,
    /// Force DNSSEC on (`Some(true)`) or off (`Some(false)`) for every
    /// authoritative service; `None` follows each service's `dnssec` key
    pub dnssec: Option<bool>,
    /// Write the topology as Graphviz DOT here
    pub graph: Option<PathBuf>,
    /// Fixed zone serial; defaults to the current UNIX time
    pub serial: Option<u32>,
    /// Testbed file the project was loaded from, for error messages
    pub source: Option<PathBuf>,
}

impl BuildOptions {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
            base_dir: PathBuf::from("."),
            jobs: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            dnssec: None,
            graph: None,
            serial: None,
            source: None,
        }
    }

    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn with_dnssec(mut self, dnssec: Option<bool>) -> Self {
        self.dnssec = dnssec;
        self
    }

    pub fn with_graph(mut self, path: impl Into<PathBuf>) -> Self {
        self.graph = Some(path.into());
        self
    }

    pub fn with_serial(mut self, serial: u32) -> Self {
        self.serial = Some(serial);
        self
    }

    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    /// Serial stamped into every SOA of this build
    pub fn effective_serial(&self) -> u32 {
        self.serial.unwrap_or_else(|| {
            u32::try_from(chrono::Utc::now().timestamp()).unwrap_or(u32::MAX)
        })
    }
}
