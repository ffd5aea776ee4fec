use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::warn;

use dnsbuilder::infrastructure::BindDnssecSigner;
use dnsbuilder::BuildOptions;

use super::Session;

/// Flags that override settings for one build
#[derive(Debug, Default)]
pub struct BuildFlags {
    pub output: Option<PathBuf>,
    pub jobs: Option<usize>,
    pub dnssec: Option<bool>,
    pub graph: Option<PathBuf>,
    pub serial: Option<u32>,
}

pub fn cmd_build(config: &Path, flags: BuildFlags) -> Result<()> {
    let session = Session::open(config)?;
    let settings = &session.settings;

    let output = flags.output.unwrap_or_else(|| settings.build.output.clone());
    let mut options = BuildOptions::new(&output)
        .with_base_dir(&session.base_dir)
        .with_source(config)
        .with_dnssec(flags.dnssec.or(settings.build.dnssec));
    if let Some(jobs) = flags.jobs.or(settings.build.jobs) {
        options = options.with_jobs(jobs);
    }
    if let Some(graph) = flags.graph {
        options = options.with_graph(graph);
    }
    if let Some(serial) = flags.serial {
        options = options.with_serial(serial);
    }

    let signer = BindDnssecSigner::new()
        .with_keygen(&settings.signer.keygen)
        .with_signzone(&settings.signer.signzone)
        .with_algorithm(&settings.signer.algorithm);
    let mut use_case = session.use_case();
    if signer.is_available() {
        use_case = use_case.with_signer(Arc::new(signer));
    } else if options.dnssec != Some(false) {
        warn!(
            keygen = %settings.signer.keygen,
            "DNSSEC tools not found; zones will stay unsigned"
        );
    }

    let name = session.project.name.clone();
    let result = use_case
        .execute(session.project, &options)
        .with_context(|| format!("building testbed '{}'", name))?;

    println!(
        "Built '{}': {} services in {}",
        name,
        result.service_count(),
        output.display()
    );
    for service in &result.services {
        match result.addresses.get(service) {
            Some(addr) => println!("  {:<20} {}", service, addr),
            None => println!("  {}", service),
        }
    }
    for (service, zone) in &result.signed_zones {
        println!("  signed {} ({})", zone, service);
    }
    if let Some(report) = &result.trust_chain {
        println!(
            "Trust chain: {} zones, {} re-signed, {} failed",
            report.zones.len(),
            report.resigned.len(),
            report.failed.len()
        );
    }
    if let Some(graph) = &result.graph {
        println!("Topology written to {}", graph.display());
    }
    println!("Manifest: {}", result.manifest.display());
    Ok(())
}
