use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// dnsbuilder - compile a declarative DNS testbed into container artifacts
#[derive(Parser, Debug)]
#[command(name = "dnsbuilder")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the testbed: service directories, zone files, trust chain and manifest
    Build {
        /// Testbed declaration (YAML)
        config: PathBuf,

        /// Output directory (wiped before building)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Worker threads for per-service generation
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Sign every authoritative zone
        #[arg(long, conflicts_with = "no_dnssec")]
        dnssec: bool,

        /// Never sign, even where services ask for it
        #[arg(long)]
        no_dnssec: bool,

        /// Write the service topology as Graphviz DOT
        #[arg(long, value_name = "FILE")]
        graph: Option<PathBuf>,

        /// Fixed SOA serial (defaults to the current UNIX time)
        #[arg(long)]
        serial: Option<u32>,
    },

    /// Print the service topology without building
    Map {
        /// Testbed declaration (YAML)
        config: PathBuf,

        /// Print Graphviz DOT instead of an edge list
        #[arg(long)]
        dot: bool,
    },

    /// Resolve and plan the testbed, then report per-service addresses
    Check {
        /// Testbed declaration (YAML)
        config: PathBuf,
    },
}

/// Tri-state DNSSEC override from the `--dnssec` / `--no-dnssec` pair
pub fn dnssec_override(dnssec: bool, no_dnssec: bool) -> Option<bool> {
    match (dnssec, no_dnssec) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_build_defaults() {
        let cli = Cli::try_parse_from(["dnsbuilder", "build", "lab.yml"]).unwrap();
        if let Commands::Build {
            config,
            output,
            jobs,
            dnssec,
            no_dnssec,
            graph,
            serial,
        } = cli.command
        {
            assert_eq!(config, PathBuf::from("lab.yml"));
            assert!(output.is_none());
            assert!(jobs.is_none());
            assert_eq!(dnssec_override(dnssec, no_dnssec), None);
            assert!(graph.is_none());
            assert!(serial.is_none());
        } else {
            panic!("Expected Build command");
        }
    }

    #[test]
    fn test_cli_parse_build_with_options() {
        let cli = Cli::try_parse_from([
            "dnsbuilder",
            "build",
            "lab.yml",
            "-o",
            "out",
            "-j",
            "4",
            "--no-dnssec",
            "--graph",
            "lab.dot",
            "--serial",
            "2024010101",
        ])
        .unwrap();
        if let Commands::Build {
            output,
            jobs,
            dnssec,
            no_dnssec,
            graph,
            serial,
            ..
        } = cli.command
        {
            assert_eq!(output, Some(PathBuf::from("out")));
            assert_eq!(jobs, Some(4));
            assert_eq!(dnssec_override(dnssec, no_dnssec), Some(false));
            assert_eq!(graph, Some(PathBuf::from("lab.dot")));
            assert_eq!(serial, Some(2024010101));
        } else {
            panic!("Expected Build command");
        }
    }

    #[test]
    fn test_cli_dnssec_flags_conflict() {
        let result =
            Cli::try_parse_from(["dnsbuilder", "build", "lab.yml", "--dnssec", "--no-dnssec"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_map_dot() {
        let cli = Cli::try_parse_from(["dnsbuilder", "map", "lab.yml", "--dot"]).unwrap();
        assert!(matches!(cli.command, Commands::Map { dot: true, .. }));
    }

    #[test]
    fn test_cli_verbose_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["dnsbuilder", "check", "lab.yml", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Check { .. }));
    }

    #[test]
    fn test_cli_requires_config() {
        assert!(Cli::try_parse_from(["dnsbuilder", "build"]).is_err());
    }
}
