//! BIND DNSSEC tool adapter
//!
//! Every invocation runs in its own temporary directory: key files and the
//! unsigned zone are written there, the tool is run with that directory as
//! its working directory, and the outputs are read back before the
//! directory is dropped. Nothing the tools write leaks into the workspace.

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tracing::debug;

use crate::domain::ports::{GeneratedKey, KeyRole, SignedZone, SignerError, SigningRequest, ZoneSigner};

pub const DEFAULT_KEYGEN: &str = "dnssec-keygen";
pub const DEFAULT_SIGNZONE: &str = "dnssec-signzone";
pub const DEFAULT_ALGORITHM: &str = "ECDSAP256SHA256";

const UNSIGNED_FILE: &str = "zone.db";
const SIGNED_FILE: &str = "zone.db.signed";

#[derive(Debug, Clone)]
pub struct BindDnssecSigner {
    keygen: PathBuf,
    signzone: PathBuf,
    algorithm: String,
}

impl Default for BindDnssecSigner {
    fn default() -> Self {
        Self::new()
    }
}

impl BindDnssecSigner {
    pub fn new() -> Self {
        Self {
            keygen: PathBuf::from(DEFAULT_KEYGEN),
            signzone: PathBuf::from(DEFAULT_SIGNZONE),
            algorithm: DEFAULT_ALGORITHM.to_string(),
        }
    }

    pub fn with_keygen(mut self, keygen: impl Into<PathBuf>) -> Self {
        self.keygen = keygen.into();
        self
    }

    pub fn with_signzone(mut self, signzone: impl Into<PathBuf>) -> Self {
        self.signzone = signzone.into();
        self
    }

    pub fn with_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.algorithm = algorithm.into();
        self
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// Check if both tools can be started
    pub fn is_available(&self) -> bool {
        [&self.keygen, &self.signzone].iter().all(|tool| {
            Command::new(tool)
                .arg("-h")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .is_ok()
        })
    }

    // TODO: enforce a timeout on tool invocations; a hung signer blocks its worker for the rest of the build
    fn run(&self, tool: &Path, mut command: Command) -> Result<Output, SignerError> {
        let name = tool.display().to_string();
        let output = command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| SignerError::Spawn {
                tool: name.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(SignerError::Failed {
                tool: name,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output)
    }

    fn read_output(&self, tool: &Path, path: &Path) -> Result<String, SignerError> {
        std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => SignerError::MissingOutput {
                tool: tool.display().to_string(),
                expected: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            },
            _ => SignerError::Io(e),
        })
    }
}

impl ZoneSigner for BindDnssecSigner {
    fn generate_key(&self, origin: &str, role: KeyRole) -> Result<GeneratedKey, SignerError> {
        let workdir = tempfile::tempdir()?;
        let mut command = Command::new(&self.keygen);
        command.current_dir(workdir.path()).args(["-a", &self.algorithm]);
        if role == KeyRole::Ksk {
            command.args(["-f", "KSK"]);
        }
        command
            .args(["-n", "ZONE", "-K"])
            .arg(workdir.path())
            .arg(origin);

        let output = self.run(&self.keygen, command)?;
        let basename = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .rfind(|line| !line.is_empty())
            .map(str::to_string)
            .ok_or_else(|| SignerError::MissingOutput {
                tool: self.keygen.display().to_string(),
                expected: "key basename on stdout".to_string(),
            })?;

        let public_key = self.read_output(&self.keygen, &workdir.path().join(format!("{}.key", basename)))?;
        let private_key =
            self.read_output(&self.keygen, &workdir.path().join(format!("{}.private", basename)))?;
        debug!(origin, role = %role, basename = %basename, "generated DNSSEC key");

        Ok(GeneratedKey {
            basename,
            public_key,
            private_key,
        })
    }

    fn sign(&self, request: &SigningRequest<'_>) -> Result<SignedZone, SignerError> {
        let workdir = tempfile::tempdir()?;
        let dir = workdir.path();
        for key in [request.zsk, request.ksk] {
            std::fs::write(dir.join(format!("{}.key", key.basename)), &key.public_key)?;
            std::fs::write(dir.join(format!("{}.private", key.basename)), &key.private_key)?;
        }
        std::fs::write(dir.join(UNSIGNED_FILE), request.unsigned)?;

        let mut command = Command::new(&self.signzone);
        command
            .current_dir(dir)
            .args(["-3", request.salt, "-A", "-N", "INCREMENT", "-o", request.origin, "-K"])
            .arg(dir)
            .arg("-d")
            .arg(dir)
            .args(["-f", SIGNED_FILE, "-t", UNSIGNED_FILE]);
        self.run(&self.signzone, command)?;

        let signed = self.read_output(&self.signzone, &dir.join(SIGNED_FILE))?;
        let ds_record =
            self.read_output(&self.signzone, &dir.join(format!("dsset-{}", request.origin)))?;
        debug!(origin = request.origin, "signed zone");

        Ok(SignedZone { signed, ds_record })
    }
}
