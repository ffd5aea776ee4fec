//! dnsbuilder CLI - DNS testbed compiler
//!
//! Usage: dnsbuilder <COMMAND>
//!
//! Commands:
//!   build  Generate service directories, zones, trust chain and manifest
//!   map    Print the service topology
//!   check  Resolve and plan without writing artifacts

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{dnssec_override, Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Build {
            config,
            output,
            jobs,
            dnssec,
            no_dnssec,
            graph,
            serial,
        } => commands::build::cmd_build(
            &config,
            commands::build::BuildFlags {
                output,
                jobs,
                dnssec: dnssec_override(dnssec, no_dnssec),
                graph,
                serial,
            },
        ),
        Commands::Map { config, dot } => commands::map::cmd_map(&config, dot),
        Commands::Check { config } => commands::check::cmd_check(&config),
    }
}

/// `RUST_LOG` wins; otherwise each `-v` raises the level from `warn`.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init()
        .ok();
}
