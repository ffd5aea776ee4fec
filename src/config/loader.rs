//! Settings loading and layering

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{DnsbError, DnsbResult};

use super::types::Settings;
use super::ConfigWarning;

/// Settings file looked up next to the testbed declaration
pub const PROJECT_SETTINGS_FILE: &str = "dnsbuilder.toml";

const KNOWN_KEYS: &[&str] = &[
    "build",
    "output",
    "jobs",
    "dnssec",
    "signer",
    "keygen",
    "signzone",
    "algorithm",
];

/// Load one settings file and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> DnsbResult<(Settings, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path)?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);
    let settings: Settings = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| config_error(path, e))?;

    let warnings = unknown_paths
        .iter()
        .map(|p| ConfigWarning::unknown_key(p, path, &content, KNOWN_KEYS))
        .collect();
    Ok((settings, warnings))
}

/// Merge the files that exist, lowest priority first; later tables win key by key
pub fn load_layered(
    user: Option<&Path>,
    project: Option<&Path>,
) -> DnsbResult<(Settings, Vec<ConfigWarning>)> {
    let mut merged = toml::Table::new();
    let mut warnings = Vec::new();
    let mut origin = PathBuf::from(PROJECT_SETTINGS_FILE);

    for path in [user, project].into_iter().flatten() {
        if !path.exists() {
            continue;
        }
        let (_, found) = load_with_warnings(path)?;
        warnings.extend(found);

        let table: toml::Table = fs::read_to_string(path)?
            .parse()
            .map_err(|e| config_error(path, e))?;
        merge_tables(&mut merged, table);
        origin = path.to_path_buf();
        debug!(file = %path.display(), "settings layer loaded");
    }

    let settings = toml::Value::Table(merged)
        .try_into::<Settings>()
        .map_err(|e| config_error(&origin, e))?;
    Ok((settings, warnings))
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming)
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Apply `DNSB_*` overrides read through `lookup`
pub fn apply_env(mut settings: Settings, lookup: impl Fn(&str) -> Option<String>) -> Settings {
    if let Some(output) = lookup("DNSB_OUTPUT") {
        settings.build.output = PathBuf::from(output);
    }

    if let Some(jobs) = lookup("DNSB_JOBS") {
        match jobs.trim().parse::<usize>() {
            Ok(n) if n > 0 => settings.build.jobs = Some(n),
            _ => warn!(value = %jobs, "ignoring DNSB_JOBS: expected a positive integer"),
        }
    }

    if let Some(dnssec) = lookup("DNSB_DNSSEC") {
        match parse_switch(&dnssec) {
            Some(on) => settings.build.dnssec = Some(on),
            None => warn!(value = %dnssec, "ignoring DNSB_DNSSEC: expected true or false"),
        }
    }

    if let Some(keygen) = lookup("DNSB_KEYGEN") {
        settings.signer.keygen = keygen;
    }
    if let Some(signzone) = lookup("DNSB_SIGNZONE") {
        settings.signer.signzone = signzone;
    }
    if let Some(algorithm) = lookup("DNSB_DNSSEC_ALGORITHM") {
        settings.signer.algorithm = algorithm;
    }

    settings
}

fn parse_switch(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// `$XDG_CONFIG_HOME/dnsbuilder/config.toml`, falling back to the platform config dir
pub fn user_settings_path() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(dirs::config_dir)
        .map(|dir| dir.join("dnsbuilder").join("config.toml"))
}

fn config_error(path: &Path, e: impl std::fmt::Display) -> DnsbError {
    DnsbError::Config {
        file: path.to_path_buf(),
        message: e.to_string(),
    }
}
