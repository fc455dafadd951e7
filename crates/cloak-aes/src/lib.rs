//! AES-128 block engine used by `cloakint` to seal integer payloads.
//!
//! This crate provides:
//! - The FIPS-197 key schedule for AES-128, kept as forward round keys only.
//! - A portable single-block encrypt/decrypt (equivalent inverse cipher).
//! - An AES-NI engine on x86_64, chosen at runtime through [`Engine`].
//!
//! Key material types wipe themselves on drop. The portable engine uses
//! lookup tables and is not constant-time; prefer the hardware engine where
//! available.

#![deny(unsafe_code)]
#![deny(missing_docs)]

mod block;
mod engine;
mod key;
#[cfg(target_arch = "x86_64")]
#[allow(unsafe_code)]
mod ni;
mod round;
mod sbox;
mod soft;

pub use crate::block::Block;
pub use crate::engine::Engine;
pub use crate::key::{Aes128Key, RoundKeys, ROUNDS};
pub use crate::soft::{decrypt_block, encrypt_block, expand_key};
