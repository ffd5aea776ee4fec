use std::path::Path;

use anyhow::{Context, Result};

use dnsbuilder::BuildOptions;

use super::Session;

pub fn cmd_check(config: &Path) -> Result<()> {
    let session = Session::open(config)?;
    let options = BuildOptions::new(&session.settings.build.output)
        .with_base_dir(&session.base_dir)
        .with_source(config);
    let prepared = session
        .use_case()
        .prepare(session.project.clone(), &options)
        .context("resolving testbed")?;

    let ctx = &prepared.context;
    println!("Testbed '{}' on {}", ctx.project.name, ctx.project.inet);
    for (name, conf) in ctx.buildable() {
        let address = ctx
            .addresses
            .get(name)
            .map(ToString::to_string)
            .unwrap_or_else(|| "-".to_string());
        let image = ctx
            .image_of(conf)
            .map(|image| image.name.as_str())
            .unwrap_or("-");
        println!("  {:<20} {:<15} {}", name, address, image);
    }
    println!("OK: {} services", prepared.services().len());
    Ok(())
}
