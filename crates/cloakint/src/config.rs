//! Runtime configuration.

use core::fmt;
use core::str::FromStr;

use crate::error::CloakError;

/// Environment variable selecting the backend.
pub const ENV_BACKEND: &str = "CLOAKINT_BACKEND";
/// Environment variable selecting the entropy source.
pub const ENV_ENTROPY: &str = "CLOAKINT_ENTROPY";
/// Environment variable bounding hardware RNG retries (`0` = unbounded).
pub const ENV_ENTROPY_RETRIES: &str = "CLOAKINT_ENTROPY_RETRIES";

const DEFAULT_RETRY_BUDGET: u32 = 1024;

/// Which sealing backend holds the key schedule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Memory-resident schedule, software AES, hashed integrity field.
    Baseline,
    /// Hardware AES where available, fixed canary checked on every open.
    #[default]
    Hardened,
}

/// Where random words come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EntropyKind {
    /// Hardware RNG if the CPU has one, otherwise the OS generator.
    #[default]
    Auto,
    /// `RDRAND` only; absence is an initialization failure.
    Hardware,
    /// The operating system generator.
    System,
}

/// Key manager configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CloakConfig {
    /// Sealing backend.
    pub backend: BackendKind,
    /// Entropy source for key material and salts.
    pub entropy: EntropyKind,
    /// Maximum consecutive hardware RNG failures per draw; `None` retries forever.
    pub entropy_retry_budget: Option<u32>,
}

impl Default for CloakConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            entropy: EntropyKind::default(),
            entropy_retry_budget: Some(DEFAULT_RETRY_BUDGET),
        }
    }
}

impl CloakConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, CloakError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup, starting from defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CloakError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(value) = lookup(ENV_BACKEND) {
            config.backend = value.parse()?;
        }
        if let Some(value) = lookup(ENV_ENTROPY) {
            config.entropy = value.parse()?;
        }
        if let Some(value) = lookup(ENV_ENTROPY_RETRIES) {
            let budget: u32 = value.trim().parse().map_err(|_| CloakError::InvalidConfig {
                key: ENV_ENTROPY_RETRIES,
                value: value.clone(),
            })?;
            config.entropy_retry_budget = (budget != 0).then_some(budget);
        }
        Ok(config)
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Baseline => "baseline",
            Self::Hardened => "hardened",
        })
    }
}

impl FromStr for BackendKind {
    type Err = CloakError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "baseline" | "memory" => Ok(Self::Baseline),
            "hardened" => Ok(Self::Hardened),
            _ => Err(CloakError::InvalidConfig {
                key: ENV_BACKEND,
                value: s.to_owned(),
            }),
        }
    }
}

impl FromStr for EntropyKind {
    type Err = CloakError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "hardware" | "rdrand" => Ok(Self::Hardware),
            "system" | "os" => Ok(Self::System),
            _ => Err(CloakError::InvalidConfig {
                key: ENV_ENTROPY,
                value: s.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = CloakConfig::from_lookup(|_| None).expect("defaults");
        assert_eq!(config, CloakConfig::default());
        assert_eq!(config.backend, BackendKind::Hardened);
        assert_eq!(config.entropy_retry_budget, Some(DEFAULT_RETRY_BUDGET));
    }

    #[test]
    fn parses_all_settings() {
        let config = CloakConfig::from_lookup(lookup(&[
            (ENV_BACKEND, "Baseline"),
            (ENV_ENTROPY, "system"),
            (ENV_ENTROPY_RETRIES, "0"),
        ]))
        .expect("valid");
        assert_eq!(config.backend, BackendKind::Baseline);
        assert_eq!(config.entropy, EntropyKind::System);
        assert_eq!(config.entropy_retry_budget, None);
    }

    #[test]
    fn rejects_unknown_values() {
        let err = CloakConfig::from_lookup(lookup(&[(ENV_BACKEND, "turbo")])).unwrap_err();
        assert!(matches!(err, CloakError::InvalidConfig { key: ENV_BACKEND, .. }));
        let err = CloakConfig::from_lookup(lookup(&[(ENV_ENTROPY_RETRIES, "-1")])).unwrap_err();
        assert!(matches!(
            err,
            CloakError::InvalidConfig {
                key: ENV_ENTROPY_RETRIES,
                ..
            }
        ));
    }
}
