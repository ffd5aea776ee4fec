use std::path::Path;

use anyhow::{Context, Result};

use dnsbuilder::BuildOptions;

use super::Session;

pub fn cmd_map(config: &Path, dot: bool) -> Result<()> {
    let session = Session::open(config)?;
    let options = BuildOptions::new(&session.settings.build.output)
        .with_base_dir(&session.base_dir)
        .with_source(config);
    let prepared = session
        .use_case()
        .prepare(session.project.clone(), &options)
        .context("resolving testbed")?;

    if dot {
        print!("{}", prepared.topology.to_dot());
    } else if prepared.topology.edges.is_empty() {
        println!("No dependencies between services");
    } else {
        print!("{}", prepared.topology);
    }
    Ok(())
}
