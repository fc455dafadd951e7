//! Baseline backend: memory-resident schedule and a hashed integrity field.

use cloak_aes::{Engine, RoundKeys};

use super::SealingBackend;
use crate::config::BackendKind;
use crate::tamper;

pub(crate) struct MemoryBackend {
    round_keys: RoundKeys,
    engine: Engine,
}

impl MemoryBackend {
    pub(crate) fn new(round_keys: RoundKeys) -> Self {
        Self {
            round_keys,
            engine: Engine::software(),
        }
    }
}

impl SealingBackend for MemoryBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Baseline
    }

    fn engine(&self) -> Engine {
        self.engine
    }

    fn round_keys(&self) -> &RoundKeys {
        &self.round_keys
    }

    fn tag_for(&self, payload: u64, salt: u32) -> u32 {
        tamper::integrity_hash(payload, salt)
    }
}
