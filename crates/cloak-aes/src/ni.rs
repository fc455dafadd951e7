//! AES-NI single-block engine for x86_64.
//!
//! Round keys are loaded into XMM registers for the duration of one call and
//! the inverse keys for decryption come from `aesimc` on the forward schedule.
//! Callers must check [`is_supported`] before using the `unsafe` entry points.

use core::arch::x86_64::{
    __m128i, _mm_aesdec_si128, _mm_aesdeclast_si128, _mm_aesenc_si128, _mm_aesenclast_si128,
    _mm_aesimc_si128, _mm_cvtsi128_si32, _mm_cvtsi128_si64, _mm_loadu_si128, _mm_srli_si128,
    _mm_storeu_si128, _mm_xor_si128,
};

use crate::block::Block;
use crate::key::{RoundKeys, ROUNDS};

/// Whether the running CPU exposes the AES instruction set.
pub fn is_supported() -> bool {
    std::arch::is_x86_feature_detected!("aes")
}

#[inline(always)]
unsafe fn load(block: &Block) -> __m128i {
    _mm_loadu_si128(block.as_ptr().cast())
}

#[inline(always)]
unsafe fn store(value: __m128i) -> Block {
    let mut out = [0u8; 16];
    _mm_storeu_si128(out.as_mut_ptr().cast(), value);
    out
}

/// # Safety
/// The CPU must support AES-NI.
#[target_feature(enable = "aes")]
pub(crate) unsafe fn encrypt_block(block: &Block, round_keys: &RoundKeys) -> Block {
    let mut state = _mm_xor_si128(load(block), load(round_keys.get(0)));
    for round in 1..ROUNDS {
        state = _mm_aesenc_si128(state, load(round_keys.get(round)));
    }
    state = _mm_aesenclast_si128(state, load(round_keys.get(ROUNDS)));
    store(state)
}

#[inline]
#[target_feature(enable = "aes")]
unsafe fn decrypt_state(block: &Block, round_keys: &RoundKeys) -> __m128i {
    let mut state = _mm_xor_si128(load(block), load(round_keys.get(ROUNDS)));
    for round in (1..ROUNDS).rev() {
        let inverse = _mm_aesimc_si128(load(round_keys.get(round)));
        state = _mm_aesdec_si128(state, inverse);
    }
    _mm_aesdeclast_si128(state, load(round_keys.get(0)))
}

/// # Safety
/// The CPU must support AES-NI.
#[target_feature(enable = "aes")]
pub(crate) unsafe fn decrypt_block(block: &Block, round_keys: &RoundKeys) -> Block {
    store(decrypt_state(block, round_keys))
}

/// Decrypts in registers and releases the low 8 bytes only when the last
/// 4 bytes equal `tag` (little-endian). Nothing is written to memory on a
/// mismatch.
///
/// # Safety
/// The CPU must support AES-NI.
#[target_feature(enable = "aes")]
pub(crate) unsafe fn decrypt_tagged(
    block: &Block,
    round_keys: &RoundKeys,
    tag: u32,
) -> Option<u64> {
    let state = decrypt_state(block, round_keys);
    let found = _mm_cvtsi128_si32(_mm_srli_si128::<12>(state)) as u32;
    if found != tag {
        return None;
    }
    Some(_mm_cvtsi128_si64(state) as u64)
}
