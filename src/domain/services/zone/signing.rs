//! DNSSEC signing flow
//!
//! Key generation and signing are delegated to a [`ZoneSigner`]. This
//! module only decides what to feed it: a zone-derived NSEC3 salt, the
//! `$INCLUDE` lines for both public keys, and for re-signing the children's
//! DS records appended to the unsigned text.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::ports::{GeneratedKey, KeyRole, SignerError, SigningRequest, ZoneSigner};
use crate::domain::value_objects::ZoneName;

/// Hex of the first 8 bytes of SHA-256 over the zone origin
pub fn nsec3_salt(zone: &ZoneName) -> String {
    Sha256::digest(zone.origin().as_bytes())
        .iter()
        .take(8)
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Metadata persisted next to a zone's keys so the trust-chain pass can
/// re-sign with the same key pairs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMaterial {
    pub zone: String,
    pub service: String,
    pub zsk: String,
    pub ksk: String,
    pub salt: String,
}

/// Result of a successful signing run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedOutput {
    /// Unsigned text with the `$INCLUDE` lines, as handed to the signer
    pub unsigned: String,
    pub signed: String,
    pub ds_record: String,
    pub zsk: GeneratedKey,
    pub ksk: GeneratedKey,
    pub salt: String,
}

impl SignedOutput {
    pub fn material(&self, zone: &ZoneName, service: &str) -> KeyMaterial {
        KeyMaterial {
            zone: zone.origin().to_string(),
            service: service.to_string(),
            zsk: self.zsk.basename.clone(),
            ksk: self.ksk.basename.clone(),
            salt: self.salt.clone(),
        }
    }
}

fn with_includes(unsigned: &str, zsk: &GeneratedKey, ksk: &GeneratedKey) -> String {
    let mut text = unsigned.to_string();
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text.push_str(&format!("$INCLUDE {}.key\n", zsk.basename));
    text.push_str(&format!("$INCLUDE {}.key\n", ksk.basename));
    text
}

/// Generate both keys and sign `unsigned`
pub fn sign_zone(signer: &dyn ZoneSigner, zone: &ZoneName, unsigned: &str) -> Result<SignedOutput, SignerError> {
    let zsk = signer.generate_key(zone.origin(), KeyRole::Zsk)?;
    let ksk = signer.generate_key(zone.origin(), KeyRole::Ksk)?;
    let unsigned = with_includes(unsigned, &zsk, &ksk);
    let salt = nsec3_salt(zone);

    let signed = signer.sign(&SigningRequest {
        origin: zone.origin(),
        unsigned: &unsigned,
        salt: &salt,
        zsk: &zsk,
        ksk: &ksk,
    })?;

    Ok(SignedOutput {
        unsigned,
        signed: signed.signed,
        ds_record: signed.ds_record,
        zsk,
        ksk,
        salt,
    })
}

/// Re-sign a zone with existing keys after appending delegation records.
///
/// `unsigned` is the text from the first signing run, which already
/// includes both public keys.
pub fn resign_zone(
    signer: &dyn ZoneSigner,
    zone: &ZoneName,
    unsigned: &str,
    child_ds: &[String],
    zsk: &GeneratedKey,
    ksk: &GeneratedKey,
) -> Result<SignedOutput, SignerError> {
    let mut text = unsigned.to_string();
    for ds in child_ds {
        if !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(ds.trim_end());
        text.push('\n');
    }
    let salt = nsec3_salt(zone);
    let signed = signer.sign(&SigningRequest {
        origin: zone.origin(),
        unsigned: &text,
        salt: &salt,
        zsk,
        ksk,
    })?;
    Ok(SignedOutput {
        unsigned: text,
        signed: signed.signed,
        ds_record: signed.ds_record,
        zsk: zsk.clone(),
        ksk: ksk.clone(),
        salt,
    })
}
