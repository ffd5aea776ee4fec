//! Zone Signer Implementations
//!
//! - `BindDnssecSigner` - shells out to `dnssec-keygen` / `dnssec-signzone`

mod bind_tools;

pub use bind_tools::{BindDnssecSigner, DEFAULT_ALGORITHM, DEFAULT_KEYGEN, DEFAULT_SIGNZONE};
