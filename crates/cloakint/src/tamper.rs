//! Tags embedded in the plaintext block and checked on every open.
//!
//! The hardened backend stores a fixed canary, which detects wrong-key
//! decryption and random corruption of the ciphertext. The baseline backend
//! stores a non-cryptographic hash of payload and salt. Neither is a MAC: an
//! attacker who can encrypt under the process key can forge either tag.

use crate::config::BackendKind;
use crate::error::CloakError;

/// Fixed canary placed in every hardened plaintext block.
pub(crate) const CANARY: u32 = 0x5ea1_c0de;

const SALT_SPREAD: u64 = 0x9e37_79b9_7f4a_7c15;

/// 64-bit finalizer from MurmurHash3.
fn fmix64(mut x: u64) -> u64 {
    x ^= x >> 33;
    x = x.wrapping_mul(0xff51_afd7_ed55_8ccd);
    x ^= x >> 33;
    x = x.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    x ^ (x >> 33)
}

/// Integrity field of the baseline backend.
pub(crate) fn integrity_hash(payload: u64, salt: u32) -> u32 {
    fmix64(payload ^ u64::from(salt).wrapping_mul(SALT_SPREAD)) as u32
}

/// Fail-stop tag comparison.
pub(crate) fn verify(found: u32, expected: u32, backend: BackendKind) -> Result<(), CloakError> {
    if found ^ expected == 0 {
        return Ok(());
    }
    Err(mismatch(backend))
}

/// Logs and builds the error for a block whose tag did not hold.
pub(crate) fn mismatch(backend: BackendKind) -> CloakError {
    tracing::error!(%backend, "tag mismatch on open");
    CloakError::IntegrityViolation { backend }
}
