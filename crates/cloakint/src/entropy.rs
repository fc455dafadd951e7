//! Random words for key material and per-operation salts.

use rand::rngs::OsRng;
use rand::RngCore;

use crate::config::EntropyKind;
use crate::error::CloakError;

/// A source of uniformly random 32-bit words.
pub(crate) trait EntropySource: Send {
    /// Draws one word.
    fn draw_u32(&mut self) -> Result<u32, CloakError>;

    /// Short name for logs and errors.
    fn name(&self) -> &'static str;
}

/// Fills `out` with words drawn from `source`.
pub(crate) fn fill_bytes(
    source: &mut dyn EntropySource,
    out: &mut [u8],
) -> Result<(), CloakError> {
    for chunk in out.chunks_mut(4) {
        let word = source.draw_u32()?.to_le_bytes();
        chunk.copy_from_slice(&word[..chunk.len()]);
    }
    Ok(())
}

/// The CPU's `RDRAND` instruction.
///
/// The instruction may transiently report that no value is ready; each draw
/// retries until it succeeds or the retry budget runs out.
#[derive(Debug)]
pub(crate) struct HardwareRng {
    retry_budget: Option<u32>,
}

impl HardwareRng {
    /// Opens the hardware generator. Fails if the CPU lacks `RDRAND`.
    pub(crate) fn new(retry_budget: Option<u32>) -> Result<Self, CloakError> {
        if !Self::is_supported() {
            return Err(CloakError::EntropyUnavailable {
                generator: "rdrand",
                reason: "instruction not supported by this CPU".into(),
            });
        }
        Ok(Self { retry_budget })
    }

    /// Whether `RDRAND` is available.
    pub(crate) fn is_supported() -> bool {
        #[cfg(target_arch = "x86_64")]
        {
            std::arch::is_x86_feature_detected!("rdrand")
        }
        #[cfg(not(target_arch = "x86_64"))]
        {
            false
        }
    }
}

#[cfg(target_arch = "x86_64")]
#[allow(unsafe_code)]
fn rdrand_step() -> Option<u32> {
    #[target_feature(enable = "rdrand")]
    unsafe fn step(out: &mut u32) -> i32 {
        core::arch::x86_64::_rdrand32_step(out)
    }

    let mut value = 0u32;
    // SAFETY: only reachable through `HardwareRng`, which checked for RDRAND.
    let ok = unsafe { step(&mut value) } == 1;
    ok.then_some(value)
}

#[cfg(not(target_arch = "x86_64"))]
fn rdrand_step() -> Option<u32> {
    None
}

impl EntropySource for HardwareRng {
    fn draw_u32(&mut self) -> Result<u32, CloakError> {
        let mut failures = 0u32;
        loop {
            if let Some(word) = rdrand_step() {
                if failures > 0 {
                    tracing::debug!(failures, "rdrand recovered after retries");
                }
                return Ok(word);
            }
            failures = failures.saturating_add(1);
            if self.retry_budget.is_some_and(|budget| failures >= budget) {
                tracing::error!(failures, "rdrand retry budget exhausted");
                return Err(CloakError::EntropyUnavailable {
                    generator: "rdrand",
                    reason: format!("no value after {failures} attempts"),
                });
            }
            core::hint::spin_loop();
        }
    }

    fn name(&self) -> &'static str {
        "rdrand"
    }
}

/// The operating system generator.
#[derive(Debug, Default)]
pub(crate) struct SystemRng;

impl EntropySource for SystemRng {
    fn draw_u32(&mut self) -> Result<u32, CloakError> {
        let mut word = [0u8; 4];
        OsRng
            .try_fill_bytes(&mut word)
            .map_err(|err| CloakError::EntropyUnavailable {
                generator: "os",
                reason: err.to_string(),
            })?;
        Ok(u32::from_le_bytes(word))
    }

    fn name(&self) -> &'static str {
        "os"
    }
}

/// Opens the source selected by `kind`.
pub(crate) fn open(
    kind: EntropyKind,
    retry_budget: Option<u32>,
) -> Result<Box<dyn EntropySource>, CloakError> {
    match kind {
        EntropyKind::Hardware => Ok(Box::new(HardwareRng::new(retry_budget)?)),
        EntropyKind::System => Ok(Box::new(SystemRng)),
        EntropyKind::Auto => {
            if HardwareRng::is_supported() {
                Ok(Box::new(HardwareRng::new(retry_budget)?))
            } else {
                tracing::warn!("no hardware RNG instruction, using the OS generator");
                Ok(Box::new(SystemRng))
            }
        }
    }
}
