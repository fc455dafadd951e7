//! AES round transformations over a column-major 16-byte state.

use crate::block::{permute, xor_in_place, Block};
use crate::sbox::{inv_sbox, sbox};

const SHIFT_ROWS: [usize; 16] = [0, 5, 10, 15, 4, 9, 14, 3, 8, 13, 2, 7, 12, 1, 6, 11];
const INV_SHIFT_ROWS: [usize; 16] = [0, 13, 10, 7, 4, 1, 14, 11, 8, 5, 2, 15, 12, 9, 6, 3];

/// SubBytes.
#[inline]
pub fn sub_bytes(state: &mut Block) {
    state.iter_mut().for_each(|b| *b = sbox(*b));
}

/// InvSubBytes.
#[inline]
pub fn inv_sub_bytes(state: &mut Block) {
    state.iter_mut().for_each(|b| *b = inv_sbox(*b));
}

/// ShiftRows: row `r` rotates left by `r` positions.
#[inline]
pub fn shift_rows(state: &mut Block) {
    permute(state, &SHIFT_ROWS);
}

/// InvShiftRows.
#[inline]
pub fn inv_shift_rows(state: &mut Block) {
    permute(state, &INV_SHIFT_ROWS);
}

#[inline]
fn xtime(byte: u8) -> u8 {
    (byte << 1) ^ (0x1b & 0u8.wrapping_sub(byte >> 7))
}

/// Multiplication in GF(2^8) modulo the AES polynomial.
fn gf_mul(a: u8, b: u8) -> u8 {
    let mut acc = 0u8;
    let mut a = a;
    for bit in 0..8 {
        acc ^= a & 0u8.wrapping_sub((b >> bit) & 1);
        a = xtime(a);
    }
    acc
}

/// MixColumns.
pub fn mix_columns(state: &mut Block) {
    for col in state.chunks_exact_mut(4) {
        let [a0, a1, a2, a3] = [col[0], col[1], col[2], col[3]];
        let all = a0 ^ a1 ^ a2 ^ a3;
        col[0] = a0 ^ all ^ xtime(a0 ^ a1);
        col[1] = a1 ^ all ^ xtime(a1 ^ a2);
        col[2] = a2 ^ all ^ xtime(a2 ^ a3);
        col[3] = a3 ^ all ^ xtime(a3 ^ a0);
    }
}

/// InvMixColumns.
pub fn inv_mix_columns(state: &mut Block) {
    const ROW: [u8; 4] = [0x0e, 0x0b, 0x0d, 0x09];
    for col in state.chunks_exact_mut(4) {
        let input = [col[0], col[1], col[2], col[3]];
        for (row, out) in col.iter_mut().enumerate() {
            *out = (0..4).fold(0u8, |acc, i| acc ^ gf_mul(input[i], ROW[(i + 4 - row) % 4]));
        }
    }
}

/// AddRoundKey.
#[inline]
pub fn add_round_key(state: &mut Block, round_key: &Block) {
    xor_in_place(state, round_key);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mix_columns_fips_example() {
        // FIPS-197 §5.1.3 column: db 13 53 45 -> 8e 4d a1 bc
        let mut state = [0u8; 16];
        state[..4].copy_from_slice(&[0xdb, 0x13, 0x53, 0x45]);
        mix_columns(&mut state);
        assert_eq!(&state[..4], &[0x8e, 0x4d, 0xa1, 0xbc]);
        inv_mix_columns(&mut state);
        assert_eq!(&state[..4], &[0xdb, 0x13, 0x53, 0x45]);
    }

    #[test]
    fn shift_rows_inverts() {
        let original: Block = core::array::from_fn(|i| i as u8);
        let mut state = original;
        shift_rows(&mut state);
        assert_eq!(state[1], 5);
        inv_shift_rows(&mut state);
        assert_eq!(state, original);
    }

    #[test]
    fn gf_mul_matches_known_products() {
        assert_eq!(gf_mul(0x57, 0x83), 0xc1);
        assert_eq!(gf_mul(0x57, 0x13), 0xfe);
        assert_eq!(gf_mul(0x01, 0xab), 0xab);
    }
}
