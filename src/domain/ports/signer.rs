//! Zone signer port
//!
//! DNSSEC cryptography is never done in-process. Key generation and zone
//! signing are delegated to an external capability, normally the BIND
//! `dnssec-keygen` / `dnssec-signzone` pair, and tests use a deterministic
//! fake.

use std::fmt;
use thiserror::Error;

/// DNSSEC key role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyRole {
    /// Zone-signing key
    Zsk,
    /// Key-signing key
    Ksk,
}

impl KeyRole {
    /// Suffix used for key files in the key namespace
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyRole::Zsk => "zsk",
            KeyRole::Ksk => "ksk",
        }
    }
}

impl fmt::Display for KeyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generated key pair
///
/// `basename` is opaque: it is whatever the tool printed (for BIND,
/// `K<zone>.+<alg>+<tag>`). The `$INCLUDE` directive and the signer's
/// key lookup both depend on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedKey {
    pub basename: String,
    pub public_key: String,
    pub private_key: String,
}

/// Everything needed to sign one zone
#[derive(Debug, Clone)]
pub struct SigningRequest<'a> {
    /// Zone origin, dot-terminated
    pub origin: &'a str,
    /// Unsigned zone text, already carrying `$INCLUDE` lines for both keys
    pub unsigned: &'a str,
    /// Hex NSEC3 salt
    pub salt: &'a str,
    pub zsk: &'a GeneratedKey,
    pub ksk: &'a GeneratedKey,
}

/// Signing output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedZone {
    pub signed: String,
    /// DS record text for the parent zone
    pub ds_record: String,
}

/// Signer failures. All of them are recoverable for the build.
#[derive(Debug, Error)]
pub enum SignerError {
    #[error("signing tool '{tool}' could not be started: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("signing tool '{tool}' exited with {status}: {stderr}")]
    Failed {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("signing tool '{tool}' did not produce {expected}")]
    MissingOutput { tool: String, expected: String },

    #[error("signer I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// External DNSSEC capability
pub trait ZoneSigner: Send + Sync {
    /// Generate a key pair for `origin` in the given role
    fn generate_key(&self, origin: &str, role: KeyRole) -> Result<GeneratedKey, SignerError>;

    /// Sign a zone, returning the signed text and its DS record
    fn sign(&self, request: &SigningRequest<'_>) -> Result<SignedZone, SignerError>;
}
