//! Integers that stay encrypted in memory.
//!
//! A [`Cloaked`] value holds only a 128-bit AES ciphertext of its payload.
//! The payload exists in plaintext only while an operation runs: operands
//! are opened, the native arithmetic is performed, and the result is sealed
//! again under a fresh random salt. This limits what a memory dump, cold-boot
//! read or passive scraper can recover. It does not help against code
//! running inside the process.
//!
//! ```text
//! entropy (RDRAND / OS) ─► ephemeral AES-128 key ─► round keys (once per process)
//!                                                        │
//!        payload | salt | tag ──► seal ──► CiphertextBlock ──► open + tag check
//! ```
//!
//! Two backends share one interface and are chosen by [`CloakConfig`]:
//! - `Baseline`: software AES, integrity field is a hash of payload and salt.
//! - `Hardened`: AES-NI when available, a fixed canary checked on every open.
//!
//! The key is generated lazily on first use (or explicitly with [`init`]) and
//! never leaves the process. Ciphertext has no serialization.

#![deny(unsafe_code)]
#![deny(missing_docs)]

mod backend;
mod block;
mod config;
mod entropy;
mod error;
mod keyring;
mod payload;
mod tamper;
mod value;

pub use crate::block::CiphertextBlock;
pub use crate::config::{
    BackendKind, CloakConfig, EntropyKind, ENV_BACKEND, ENV_ENTROPY, ENV_ENTROPY_RETRIES,
};
pub use crate::error::CloakError;
pub use crate::keyring::Keyring;
pub use crate::payload::Payload;
pub use crate::value::{
    Cloaked, CloakedI16, CloakedI32, CloakedI64, CloakedI8, CloakedU16, CloakedU32, CloakedU64,
    CloakedU8,
};

/// Builds the process-wide ephemeral key with an explicit configuration.
///
/// Returns [`CloakError::AlreadyInitialized`] if the key already exists,
/// whether from an earlier `init` or from lazy first use.
pub fn init(config: &CloakConfig) -> Result<&'static Keyring, CloakError> {
    keyring::install(config)
}

/// The process-wide keyring, initializing it on first use.
pub fn keyring() -> Result<&'static Keyring, CloakError> {
    keyring::global()
}
