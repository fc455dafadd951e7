//! Portable AES-128: key expansion and single-block encrypt/decrypt.
//!
//! Decryption follows the equivalent inverse cipher (FIPS-197 §5.3.5) so the
//! same forward schedule serves both directions.

use zeroize::Zeroize;

use crate::block::{wipe, Block};
use crate::key::{Aes128Key, RoundKeys, ROUNDS};
use crate::round::{
    add_round_key, inv_mix_columns, inv_shift_rows, inv_sub_bytes, mix_columns, shift_rows,
    sub_bytes,
};
use crate::sbox::sbox;

const RCON: [u8; ROUNDS] = [0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40, 0x80, 0x1b, 0x36];

/// Expands a 128-bit key into the 11 forward round keys.
pub fn expand_key(key: &Aes128Key) -> RoundKeys {
    let mut blocks = [[0u8; 16]; ROUNDS + 1];
    blocks[0] = *key.as_bytes();

    for round in 1..=ROUNDS {
        let prev = blocks[round - 1];
        // RotWord, SubWord, Rcon on the last word of the previous key.
        let mut carry = [prev[13], prev[14], prev[15], prev[12]];
        carry.iter_mut().for_each(|b| *b = sbox(*b));
        carry[0] ^= RCON[round - 1];

        let next = &mut blocks[round];
        for (offset, byte) in next.iter_mut().enumerate() {
            let word = offset / 4;
            let lane = offset % 4;
            let feed = if word == 0 { carry[lane] } else { 0 };
            *byte = prev[offset] ^ feed;
        }
        for offset in 4..16 {
            next[offset] ^= next[offset - 4];
        }
        carry.zeroize();
    }

    let round_keys = RoundKeys::from_blocks(blocks);
    blocks.zeroize();
    round_keys
}

/// Encrypts one block with the forward schedule.
pub fn encrypt_block(block: &Block, round_keys: &RoundKeys) -> Block {
    let mut state = *block;
    add_round_key(&mut state, round_keys.get(0));

    for round in 1..ROUNDS {
        sub_bytes(&mut state);
        shift_rows(&mut state);
        mix_columns(&mut state);
        add_round_key(&mut state, round_keys.get(round));
    }

    sub_bytes(&mut state);
    shift_rows(&mut state);
    add_round_key(&mut state, round_keys.get(ROUNDS));
    state
}

/// Decrypts one block, deriving interior inverse round keys on the fly.
pub fn decrypt_block(block: &Block, round_keys: &RoundKeys) -> Block {
    let mut state = *block;
    add_round_key(&mut state, round_keys.get(ROUNDS));

    for round in (1..ROUNDS).rev() {
        inv_sub_bytes(&mut state);
        inv_shift_rows(&mut state);
        inv_mix_columns(&mut state);
        let mut dk = round_keys.inverse(round);
        add_round_key(&mut state, &dk);
        wipe(&mut dk);
    }

    inv_sub_bytes(&mut state);
    inv_shift_rows(&mut state);
    add_round_key(&mut state, round_keys.get(0));
    state
}
