//! Error types and the fail-stop policy.

use thiserror::Error;

use crate::config::BackendKind;

/// Everything that can go wrong while sealing or opening a value.
///
/// None of these are recoverable in place: the offending operation is
/// abandoned and no value derived from a failed open is ever returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CloakError {
    /// The ephemeral key schedule could not be built.
    #[error("initialization failure: {reason}")]
    InitializationFailure {
        /// What prevented initialization.
        reason: String,
    },

    /// An entropy source could not produce a word.
    #[error("entropy source `{generator}` unavailable: {reason}")]
    EntropyUnavailable {
        /// Name of the failing generator.
        generator: &'static str,
        /// Failure detail.
        reason: String,
    },

    /// The tag recovered on decrypt did not match.
    #[error("integrity violation detected by the {backend} backend")]
    IntegrityViolation {
        /// Backend that rejected the block.
        backend: BackendKind,
    },

    /// Division or remainder with a zero divisor (checked forms only).
    #[error("attempt to divide by zero")]
    DivideByZero,

    /// `init` was called after the key manager was already set up.
    #[error("ephemeral key manager already initialized")]
    AlreadyInitialized,

    /// A configuration value could not be parsed.
    #[error("invalid value {value:?} for {key}")]
    InvalidConfig {
        /// Setting name.
        key: &'static str,
        /// Rejected value.
        value: String,
    },
}

/// Aborts the current operation with a structured error.
///
/// Used by the infallible API surface (operators, `Clone`, `get`).
#[cold]
#[track_caller]
pub(crate) fn fail_stop<T>(err: CloakError) -> T {
    tracing::error!(error = %err, "fail-stop");
    panic!("{err}")
}
