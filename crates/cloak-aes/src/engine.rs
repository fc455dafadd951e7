//! Runtime selection between the portable and AES-NI engines.

use crate::block::{wipe, Block};
use zeroize::Zeroize;
use crate::key::RoundKeys;
use crate::soft;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Kind {
    Software,
    #[cfg(target_arch = "x86_64")]
    AesNi,
}

/// A single-block AES-128 engine.
///
/// The hardware variant can only be obtained after a successful CPU feature
/// check, so holding an `Engine` is proof the selected instructions exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Engine {
    kind: Kind,
}

impl Engine {
    /// Portable table-based engine.
    pub const fn software() -> Self {
        Self {
            kind: Kind::Software,
        }
    }

    /// AES-NI engine, if the CPU supports it.
    pub fn hardware() -> Option<Self> {
        #[cfg(target_arch = "x86_64")]
        {
            if crate::ni::is_supported() {
                return Some(Self { kind: Kind::AesNi });
            }
        }
        None
    }

    /// Best available engine.
    pub fn detect() -> Self {
        Self::hardware().unwrap_or_else(Self::software)
    }

    /// Whether this engine runs on dedicated AES instructions.
    pub fn is_hardware(&self) -> bool {
        self.kind != Kind::Software
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self.kind {
            Kind::Software => "software",
            #[cfg(target_arch = "x86_64")]
            Kind::AesNi => "aes-ni",
        }
    }

    /// Encrypts one block.
    #[allow(unsafe_code)]
    pub fn encrypt_block(&self, block: &Block, round_keys: &RoundKeys) -> Block {
        match self.kind {
            Kind::Software => soft::encrypt_block(block, round_keys),
            // SAFETY: `AesNi` is only constructed after feature detection.
            #[cfg(target_arch = "x86_64")]
            Kind::AesNi => unsafe { crate::ni::encrypt_block(block, round_keys) },
        }
    }

    /// Decrypts one block.
    #[allow(unsafe_code)]
    pub fn decrypt_block(&self, block: &Block, round_keys: &RoundKeys) -> Block {
        match self.kind {
            Kind::Software => soft::decrypt_block(block, round_keys),
            // SAFETY: `AesNi` is only constructed after feature detection.
            #[cfg(target_arch = "x86_64")]
            Kind::AesNi => unsafe { crate::ni::decrypt_block(block, round_keys) },
        }
    }

    /// Decrypts a block laid out as `payload (8) | salt (4) | tag (4)`, all
    /// little-endian, and returns the payload only if the trailing word
    /// equals `tag`.
    ///
    /// The hardware engine compares the tag in registers. The software engine
    /// spills the state to a stack block that is wiped before returning.
    #[allow(unsafe_code)]
    pub fn decrypt_tagged(
        &self,
        block: &Block,
        round_keys: &RoundKeys,
        tag: u32,
    ) -> Option<u64> {
        match self.kind {
            Kind::Software => {
                let mut state = soft::decrypt_block(block, round_keys);
                let mut word = [0u8; 4];
                word.copy_from_slice(&state[12..]);
                let payload = (u32::from_le_bytes(word) == tag).then(|| {
                    let mut bytes = [0u8; 8];
                    bytes.copy_from_slice(&state[..8]);
                    let payload = u64::from_le_bytes(bytes);
                    bytes.zeroize();
                    payload
                });
                wipe(&mut state);
                payload
            }
            // SAFETY: `AesNi` is only constructed after feature detection.
            #[cfg(target_arch = "x86_64")]
            Kind::AesNi => unsafe { crate::ni::decrypt_tagged(block, round_keys, tag) },
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::detect()
    }
}
