//! Hardened backend: hardware AES when present and a canary checked on
//! every open.
//!
//! Round keys enter XMM registers only for the duration of one block
//! operation, and on open the decrypted state stays in registers until the
//! canary has been compared. The software fallback spills one block to the
//! stack and wipes it before returning.
//!
//! Across calls the schedule stays in zeroize-on-drop memory; pinning it in
//! registers for the life of the process cannot be expressed without
//! reserving registers from the compiler.

use cloak_aes::{Engine, RoundKeys};

use super::SealingBackend;
use crate::block::CiphertextBlock;
use crate::config::BackendKind;
use crate::error::CloakError;
use crate::tamper::{self, CANARY};

pub(crate) struct HardenedBackend {
    round_keys: RoundKeys,
    engine: Engine,
}

impl HardenedBackend {
    pub(crate) fn new(round_keys: RoundKeys) -> Self {
        let engine = Engine::detect();
        if !engine.is_hardware() {
            tracing::warn!("AES-NI unavailable, hardened backend using the software engine");
        }
        Self { round_keys, engine }
    }
}

impl SealingBackend for HardenedBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Hardened
    }

    fn engine(&self) -> Engine {
        self.engine
    }

    fn round_keys(&self) -> &RoundKeys {
        &self.round_keys
    }

    fn tag_for(&self, _payload: u64, _salt: u32) -> u32 {
        CANARY
    }

    /// On AES-NI the canary is compared in registers and the payload leaves
    /// them only after it holds.
    fn open(&self, block: &CiphertextBlock) -> Result<u64, CloakError> {
        self.engine
            .decrypt_tagged(block.as_bytes(), &self.round_keys, CANARY)
            .ok_or_else(|| tamper::mismatch(BackendKind::Hardened))
    }
}
