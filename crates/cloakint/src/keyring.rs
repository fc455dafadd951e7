//! Process-wide ephemeral key manager.
//!
//! The first caller draws 128 bits of key material, expands the AES-128
//! schedule, wipes the raw key and hands the schedule to the configured
//! backend. Initialization is double-checked behind a mutex so concurrent
//! first users build exactly one schedule, and every later caller observes
//! the completed keyring through the `OnceLock`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock, PoisonError};

use cloak_aes::{expand_key, Aes128Key, RoundKeys};
use zeroize::Zeroizing;

use crate::backend::{self, SealingBackend};
use crate::block::CiphertextBlock;
use crate::config::{BackendKind, CloakConfig};
use crate::entropy::{self, EntropySource};
use crate::error::CloakError;

static KEYRING: OnceLock<Keyring> = OnceLock::new();
static INIT_LOCK: Mutex<()> = Mutex::new(());
static GENERATED: AtomicUsize = AtomicUsize::new(0);

/// The ephemeral key schedule plus the entropy source used for salts.
pub struct Keyring {
    backend: Box<dyn SealingBackend>,
    entropy: Mutex<Box<dyn EntropySource>>,
    fingerprint: u64,
}

impl Keyring {
    /// Builds a fresh keyring independent of the process-wide one.
    pub(crate) fn generate(config: &CloakConfig) -> Result<Self, CloakError> {
        let mut source = entropy::open(config.entropy, config.entropy_retry_budget)
            .map_err(|err| initialization_failure(&err))?;

        let mut raw = Zeroizing::new([0u8; 16]);
        entropy::fill_bytes(source.as_mut(), raw.as_mut_slice())
            .map_err(|err| initialization_failure(&err))?;
        let round_keys = {
            let key = Aes128Key::from(*raw);
            expand_key(&key)
        };
        drop(raw);

        let backend = backend::build(config.backend, round_keys);
        let fingerprint = backend.fingerprint();
        let generation = GENERATED.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(
            generation,
            backend = %backend.kind(),
            engine = backend.engine().name(),
            entropy = source.name(),
            "ephemeral key schedule ready"
        );

        Ok(Self {
            backend,
            entropy: Mutex::new(source),
            fingerprint,
        })
    }

    /// Backend holding the schedule.
    pub fn backend(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Name of the AES engine in use.
    pub fn engine_name(&self) -> &'static str {
        self.backend.engine().name()
    }

    /// Non-secret identifier of the ephemeral key, stable for the process.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    pub(crate) fn schedule(&self) -> &RoundKeys {
        self.backend.round_keys()
    }

    /// Draws a fresh salt. Salts are independent uniform words with no
    /// uniqueness enforcement.
    pub(crate) fn draw_salt(&self) -> Result<u32, CloakError> {
        let mut source = self.entropy.lock().unwrap_or_else(PoisonError::into_inner);
        source.draw_u32()
    }

    /// Seals `payload` under a fresh salt.
    pub(crate) fn seal(&self, payload: u64) -> Result<CiphertextBlock, CloakError> {
        let salt = self.draw_salt()?;
        Ok(self.backend.seal(payload, salt))
    }

    /// Opens `block`, failing on a tag mismatch.
    pub(crate) fn open(&self, block: &CiphertextBlock) -> Result<u64, CloakError> {
        self.backend.open(block)
    }
}

impl core::fmt::Debug for Keyring {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Keyring")
            .field("backend", &self.backend.kind())
            .field("engine", &self.backend.engine().name())
            .field("fingerprint", &format_args!("{:016x}", self.fingerprint))
            .finish_non_exhaustive()
    }
}

fn initialization_failure(err: &CloakError) -> CloakError {
    tracing::error!(error = %err, "cannot build ephemeral key");
    CloakError::InitializationFailure {
        reason: err.to_string(),
    }
}

/// Double-checked one-time initialization: the fast path reads `cell`
/// without locking, and `build` runs at most once under `lock`.
fn init_once<'a, T>(
    cell: &'a OnceLock<T>,
    lock: &Mutex<()>,
    build: impl FnOnce() -> Result<T, CloakError>,
) -> Result<&'a T, CloakError> {
    if let Some(value) = cell.get() {
        return Ok(value);
    }
    let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(value) = cell.get() {
        return Ok(value);
    }
    let value = build()?;
    Ok(cell.get_or_init(|| value))
}

/// Installs the process-wide keyring with an explicit configuration.
pub fn install(config: &CloakConfig) -> Result<&'static Keyring, CloakError> {
    let mut built = false;
    let keyring = init_once(&KEYRING, &INIT_LOCK, || {
        built = true;
        Keyring::generate(config)
    })?;
    if !built {
        return Err(CloakError::AlreadyInitialized);
    }
    Ok(keyring)
}

/// Returns the process-wide keyring, building it from the environment on
/// first use.
pub fn global() -> Result<&'static Keyring, CloakError> {
    init_once(&KEYRING, &INIT_LOCK, || {
        let config = CloakConfig::from_env().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "ignoring invalid environment, using defaults");
            CloakConfig::default()
        });
        Keyring::generate(&config)
    })
}

#[cfg(test)]
pub(crate) fn generated_count() -> usize {
    GENERATED.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Barrier;
    use std::time::Duration;

    use super::*;
    use crate::config::EntropyKind;

    fn config(backend: BackendKind) -> CloakConfig {
        CloakConfig {
            backend,
            entropy: EntropyKind::Auto,
            ..CloakConfig::default()
        }
    }

    #[test]
    fn global_is_built_once_and_reused() {
        let first = global().expect("keyring");
        let second = global().expect("keyring");
        assert!(std::ptr::eq(first, second));
        assert!(first.schedule().ct_eq(second.schedule()));
        assert_eq!(first.fingerprint(), second.fingerprint());
        assert_eq!(install(&CloakConfig::default()).unwrap_err(), CloakError::AlreadyInitialized);
    }

    #[test]
    fn racing_first_users_build_exactly_once() {
        const THREADS: usize = 16;
        let cell = OnceLock::new();
        let lock = Mutex::new(());
        let builds = AtomicUsize::new(0);
        let barrier = Barrier::new(THREADS);

        let seen: Vec<usize> = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..THREADS)
                .map(|id| {
                    let (cell, lock, builds, barrier) = (&cell, &lock, &builds, &barrier);
                    scope.spawn(move || {
                        barrier.wait();
                        let value = init_once(cell, lock, || {
                            builds.fetch_add(1, Ordering::SeqCst);
                            // Hold the build open so the other threads pile
                            // up behind the lock.
                            std::thread::sleep(Duration::from_millis(20));
                            Ok(id)
                        })
                        .expect("init");
                        *value
                    })
                })
                .collect();
            workers.into_iter().map(|w| w.join().expect("worker")).collect()
        });

        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert!(seen.iter().all(|&id| id == seen[0]));
    }

    #[test]
    fn failed_build_leaves_cell_empty() {
        let cell = OnceLock::new();
        let lock = Mutex::new(());
        let err = init_once(&cell, &lock, || -> Result<u8, _> { Err(CloakError::DivideByZero) });
        assert_eq!(err, Err(CloakError::DivideByZero));
        assert_eq!(init_once(&cell, &lock, || Ok(9u8)), Ok(&9));
        assert_eq!(init_once(&cell, &lock, || Ok(1u8)), Ok(&9));
    }

    #[test]
    fn salts_use_all_32_bits() {
        const DRAWS: usize = 20_000;
        let keyring = Keyring::generate(&config(BackendKind::Hardened)).expect("keyring");
        let mut seen = HashSet::with_capacity(DRAWS);
        let (mut any, mut all) = (0u32, u32::MAX);
        for _ in 0..DRAWS {
            let salt = keyring.draw_salt().expect("salt");
            seen.insert(salt);
            any |= salt;
            all &= salt;
        }
        // 20k uniform 32-bit draws collide about 0.05 times on average; a
        // 24-bit salt would collide about 12 times.
        assert!(DRAWS - seen.len() <= 2, "{} collisions", DRAWS - seen.len());
        assert_eq!(any, u32::MAX, "some salt bit never set");
        assert_eq!(all, 0, "some salt bit never cleared");
    }

    #[test]
    fn independent_keyrings_use_different_keys() {
        let a = Keyring::generate(&config(BackendKind::Baseline)).expect("a");
        let b = Keyring::generate(&config(BackendKind::Hardened)).expect("b");
        assert!(!a.schedule().ct_eq(b.schedule()));
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert!(generated_count() >= 2);
    }

    #[test]
    fn seal_open_round_trip_and_foreign_key_rejection() {
        for backend in [BackendKind::Baseline, BackendKind::Hardened] {
            let ours = Keyring::generate(&config(backend)).expect("ours");
            let theirs = Keyring::generate(&config(backend)).expect("theirs");
            let sealed = ours.seal(1234).expect("seal");
            assert_eq!(ours.open(&sealed), Ok(1234));
            assert_eq!(
                theirs.open(&sealed),
                Err(CloakError::IntegrityViolation { backend })
            );
        }
    }

    #[test]
    fn debug_hides_key_material() {
        let keyring = Keyring::generate(&config(BackendKind::Hardened)).expect("keyring");
        let text = format!("{keyring:?}");
        assert!(text.contains("Hardened"));
        assert!(text.contains(&format!("{:016x}", keyring.fingerprint())));
    }
}
