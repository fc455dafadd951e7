//! Sealing backends: where the schedule lives and which tag guards a block.

mod hardened;
mod memory;

pub(crate) use hardened::HardenedBackend;
pub(crate) use memory::MemoryBackend;

use cloak_aes::{Engine, RoundKeys};
use zeroize::Zeroizing;

use crate::block::{CiphertextBlock, PlaintextBlock};
use crate::config::BackendKind;
use crate::error::CloakError;
use crate::tamper;

/// Encrypts and decrypts integer payloads under one key schedule.
pub(crate) trait SealingBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    fn engine(&self) -> Engine;

    fn round_keys(&self) -> &RoundKeys;

    /// Tag stored alongside `payload` and `salt`.
    fn tag_for(&self, payload: u64, salt: u32) -> u32;

    /// Packs `payload` with `salt` and its tag, then encrypts.
    fn seal(&self, payload: u64, salt: u32) -> CiphertextBlock {
        let plain = PlaintextBlock {
            payload,
            salt,
            tag: self.tag_for(payload, salt),
        };
        let bytes = plain.to_bytes();
        CiphertextBlock::new(self.engine().encrypt_block(&bytes, self.round_keys()))
    }

    /// Decrypts and checks the tag. Returns the payload only if the tag holds.
    fn open(&self, block: &CiphertextBlock) -> Result<u64, CloakError> {
        let bytes =
            Zeroizing::new(self.engine().decrypt_block(block.as_bytes(), self.round_keys()));
        let plain = PlaintextBlock::from_bytes(&bytes);
        let expected = self.tag_for(plain.payload, plain.salt);
        tamper::verify(plain.tag, expected, self.kind())?;
        Ok(plain.payload)
    }

    /// Non-secret identifier of the key: the first 8 bytes of `E_k(0)`.
    fn fingerprint(&self) -> u64 {
        let zero_block = self.engine().encrypt_block(&[0u8; 16], self.round_keys());
        let mut head = [0u8; 8];
        head.copy_from_slice(&zero_block[..8]);
        u64::from_le_bytes(head)
    }
}

/// Builds the backend selected by `kind` around `round_keys`.
pub(crate) fn build(kind: BackendKind, round_keys: RoundKeys) -> Box<dyn SealingBackend> {
    match kind {
        BackendKind::Baseline => Box::new(MemoryBackend::new(round_keys)),
        BackendKind::Hardened => Box::new(HardenedBackend::new(round_keys)),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use cloak_aes::{expand_key, Aes128Key};

    pub(crate) fn schedule(byte: u8) -> RoundKeys {
        expand_key(&Aes128Key::from([byte; 16]))
    }

    fn both(byte: u8) -> [Box<dyn SealingBackend>; 2] {
        [
            build(BackendKind::Baseline, schedule(byte)),
            build(BackendKind::Hardened, schedule(byte)),
        ]
    }

    #[test]
    fn round_trip_on_both_backends() {
        for backend in both(1) {
            for (payload, salt) in [(0u64, 0u32), (30, 7), (u64::MAX, u32::MAX), (1 << 63, 99)] {
                let sealed = backend.seal(payload, salt);
                assert_eq!(backend.open(&sealed), Ok(payload), "{}", backend.kind());
            }
        }
    }

    #[test]
    fn salt_changes_ciphertext() {
        for backend in both(2) {
            assert_ne!(backend.seal(5, 1), backend.seal(5, 2));
        }
    }

    #[test]
    fn every_bit_flip_is_rejected() {
        for backend in both(3) {
            let sealed = backend.seal(0xdead_beef, 17);
            for bit in 0..128 {
                let mut tampered = sealed.clone();
                tampered.flip_bit(bit);
                assert_eq!(
                    backend.open(&tampered),
                    Err(CloakError::IntegrityViolation {
                        backend: backend.kind()
                    }),
                    "bit {bit} on {}",
                    backend.kind()
                );
            }
        }
    }

    #[test]
    fn foreign_key_fails_tag_check() {
        let [baseline_a, hardened_a] = both(4);
        let [baseline_b, hardened_b] = both(5);
        assert!(baseline_b.open(&baseline_a.seal(10, 3)).is_err());
        assert!(hardened_b.open(&hardened_a.seal(10, 3)).is_err());
    }

    #[test]
    fn backends_differ_only_in_tag() {
        let [baseline, hardened] = both(8);
        assert_eq!(hardened.tag_for(1, 2), crate::tamper::CANARY);
        assert_eq!(hardened.tag_for(u64::MAX, 0), crate::tamper::CANARY);
        assert_eq!(baseline.tag_for(1, 2), crate::tamper::integrity_hash(1, 2));

        // Same key and layout, different tag rule.
        let sealed = baseline.seal(1, 2);
        assert_ne!(crate::tamper::integrity_hash(1, 2), crate::tamper::CANARY);
        assert!(hardened.open(&sealed).is_err());
        assert_eq!(baseline.open(&sealed), Ok(1));
    }

    #[test]
    fn fingerprint_tracks_key() {
        let [baseline, hardened] = both(6);
        assert_eq!(baseline.fingerprint(), hardened.fingerprint());
        assert_ne!(baseline.fingerprint(), build(BackendKind::Baseline, schedule(7)).fingerprint());
    }
}
