//! Block representation helpers.

use zeroize::Zeroize;

/// AES block of 16 bytes.
pub type Block = [u8; 16];

/// XORs `rhs` into `dst`.
#[inline]
pub(crate) fn xor_in_place(dst: &mut Block, rhs: &Block) {
    dst.iter_mut().zip(rhs).for_each(|(d, r)| *d ^= r);
}

/// Overwrites a transient block with zeros.
#[inline]
pub(crate) fn wipe(block: &mut Block) {
    block.zeroize();
}

/// Applies a byte permutation: `state[i] = old[table[i]]`.
#[inline]
pub(crate) fn permute(state: &mut Block, table: &[usize; 16]) {
    let old = *state;
    for (dst, &src) in state.iter_mut().zip(table) {
        *dst = old[src];
    }
}
