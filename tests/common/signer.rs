//! Deterministic signer for pipeline tests.

use std::collections::HashMap;
use std::sync::Mutex;

use dnsbuilder::domain::ports::{
    GeneratedKey, KeyRole, SignedZone, SignerError, SigningRequest, ZoneSigner,
};

/// Produces fixed keys and echoes the unsigned zone back as "signed".
///
/// The DS digest is the number of DS lines in the signed input, so tests
/// can tell a zone signed with delegations from one signed without.
#[derive(Default)]
pub struct FakeSigner {
    signs: Mutex<HashMap<String, usize>>,
}

impl FakeSigner {
    pub fn new() -> Self {
        Self::default()
    }

    /// How often `origin` was signed
    pub fn signs(&self, origin: &str) -> usize {
        self.signs.lock().unwrap().get(origin).copied().unwrap_or(0)
    }
}

impl ZoneSigner for FakeSigner {
    fn generate_key(&self, origin: &str, role: KeyRole) -> Result<GeneratedKey, SignerError> {
        let flags = match role {
            KeyRole::Zsk => 256,
            KeyRole::Ksk => 257,
        };
        Ok(GeneratedKey {
            basename: format!("K{}+013+{}", origin, role),
            public_key: format!("{} 3600 IN DNSKEY {} 3 13 FAKE{}", origin, flags, role),
            private_key: format!("Private-key-format: v1.3\n; {} {}", origin, role),
        })
    }

    fn sign(&self, request: &SigningRequest<'_>) -> Result<SignedZone, SignerError> {
        *self
            .signs
            .lock()
            .unwrap()
            .entry(request.origin.to_string())
            .or_default() += 1;
        let delegations = request
            .unsigned
            .lines()
            .filter(|line| line.contains(" IN DS "))
            .count();
        Ok(SignedZone {
            signed: format!("; signed {}\n{}", request.origin, request.unsigned),
            ds_record: format!("{} 3600 IN DS 1 13 2 {:04X}", request.origin, delegations),
        })
    }
}
