//! Plaintext and ciphertext block layouts.
//!
//! A plaintext block is `payload (8 bytes LE) | salt (4 bytes LE) | tag (4 bytes LE)`.

use core::fmt;

use cloak_aes::Block;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Transient decrypted form. Wiped when dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub(crate) struct PlaintextBlock {
    pub(crate) payload: u64,
    pub(crate) salt: u32,
    pub(crate) tag: u32,
}

impl PlaintextBlock {
    pub(crate) fn to_bytes(&self) -> Zeroizing<Block> {
        let mut out = Zeroizing::new([0u8; 16]);
        out[..8].copy_from_slice(&self.payload.to_le_bytes());
        out[8..12].copy_from_slice(&self.salt.to_le_bytes());
        out[12..].copy_from_slice(&self.tag.to_le_bytes());
        out
    }

    pub(crate) fn from_bytes(bytes: &Block) -> Self {
        let mut payload = [0u8; 8];
        let mut salt = [0u8; 4];
        let mut tag = [0u8; 4];
        payload.copy_from_slice(&bytes[..8]);
        salt.copy_from_slice(&bytes[8..12]);
        tag.copy_from_slice(&bytes[12..]);
        let block = Self {
            payload: u64::from_le_bytes(payload),
            salt: u32::from_le_bytes(salt),
            tag: u32::from_le_bytes(tag),
        };
        payload.zeroize();
        salt.zeroize();
        tag.zeroize();
        block
    }
}

/// The sealed 128-bit form of an integer.
///
/// Meaningful only under the ephemeral key of the process that produced it;
/// it has no serialization on purpose.
#[derive(Clone, PartialEq, Eq)]
pub struct CiphertextBlock(Block);

impl CiphertextBlock {
    pub(crate) fn new(bytes: Block) -> Self {
        Self(bytes)
    }

    /// Raw ciphertext bytes.
    pub fn as_bytes(&self) -> &Block {
        &self.0
    }

    #[cfg(test)]
    pub(crate) fn flip_bit(&mut self, bit: usize) {
        self.0[bit / 8] ^= 1 << (bit % 8);
    }
}

impl fmt::Debug for CiphertextBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CiphertextBlock({})", hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_payload_salt_tag() {
        let block = PlaintextBlock {
            payload: 0x0807_0605_0403_0201,
            salt: 0x0c0b_0a09,
            tag: 0x100f_0e0d,
        };
        let bytes = block.to_bytes();
        assert_eq!(*bytes, core::array::from_fn::<u8, 16, _>(|i| i as u8 + 1));

        let parsed = PlaintextBlock::from_bytes(&bytes);
        assert_eq!(parsed.payload, block.payload);
        assert_eq!(parsed.salt, block.salt);
        assert_eq!(parsed.tag, block.tag);
    }

    #[test]
    fn debug_is_hex() {
        let ct = CiphertextBlock::new([0xab; 16]);
        assert_eq!(format!("{ct:?}"), format!("CiphertextBlock({})", "ab".repeat(16)));
    }
}
