//! Key material for AES-128.
//!
//! Both the cipher key and its expanded schedule are wiped when dropped and
//! never print their bytes through `Debug`.

use core::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::block::Block;
use crate::round::inv_mix_columns;

/// Number of AES-128 rounds.
pub const ROUNDS: usize = 10;

/// AES-128 cipher key.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Aes128Key([u8; 16]);

impl Aes128Key {
    /// Raw key bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl From<[u8; 16]> for Aes128Key {
    fn from(value: [u8; 16]) -> Self {
        Self(value)
    }
}

impl fmt::Debug for Aes128Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Aes128Key(..)")
    }
}

/// Forward round keys `K0..=K10`.
///
/// Only the encryption schedule is stored. Decryption derives each interior
/// inverse round key on demand with [`RoundKeys::inverse`].
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct RoundKeys([Block; ROUNDS + 1]);

impl RoundKeys {
    pub(crate) fn from_blocks(blocks: [Block; ROUNDS + 1]) -> Self {
        Self(blocks)
    }

    /// Returns the forward round key at `round` (0..=10).
    #[inline]
    pub fn get(&self, round: usize) -> &Block {
        &self.0[round]
    }

    /// Returns the equivalent-inverse-cipher key for `round`.
    ///
    /// Interior rounds (1..=9) get `InvMixColumns(K_round)`; the outer keys
    /// are used unchanged. The caller owns the returned copy and should wipe
    /// it once used.
    pub fn inverse(&self, round: usize) -> Block {
        let mut key = self.0[round];
        if (1..ROUNDS).contains(&round) {
            inv_mix_columns(&mut key);
        }
        key
    }

    /// Constant-time equality of two schedules.
    pub fn ct_eq(&self, other: &Self) -> bool {
        let diff = self
            .0
            .iter()
            .flatten()
            .zip(other.0.iter().flatten())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b));
        diff == 0
    }
}

impl fmt::Debug for RoundKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RoundKeys([REDACTED; 11])")
    }
}
