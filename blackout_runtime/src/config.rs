use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

use blackout_kernel::rules::DEFAULT_MAX_TRICKS;

pub const DEFAULT_DATA_DIR: &str = "./blackout_data";
pub const DEFAULT_SNAPSHOT_INTERVAL: u64 = 10;
pub const DEFAULT_LOG_FILTER: &str = "blackout_runtime=info,blackout_kernel=info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Root directory holding one subdirectory per session.
    pub data_dir: PathBuf,
    /// Write a snapshot every N sequences; 0 disables snapshots.
    pub snapshot_interval: u64,
    pub max_tricks: u8,
    /// Fixed RNG seed for reproducible shuffles.
    pub seed: Option<u64>,
    /// Filter used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            snapshot_interval: DEFAULT_SNAPSHOT_INTERVAL,
            max_tricks: DEFAULT_MAX_TRICKS,
            seed: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Load `.env` (if present) and read `BLACKOUT_*` variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup, so tests need not touch the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let snapshot_interval = match lookup("BLACKOUT_SNAPSHOT_INTERVAL") {
            Some(v) => v
                .parse()
                .context("BLACKOUT_SNAPSHOT_INTERVAL must be a number")?,
            None => defaults.snapshot_interval,
        };

        let max_tricks = match lookup("BLACKOUT_MAX_TRICKS") {
            Some(v) => v.parse().context("BLACKOUT_MAX_TRICKS must be a number")?,
            None => defaults.max_tricks,
        };

        let seed = lookup("BLACKOUT_SEED")
            .map(|v| v.parse().context("BLACKOUT_SEED must be a number"))
            .transpose()?;

        Ok(Self {
            data_dir: lookup("BLACKOUT_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            snapshot_interval,
            max_tricks,
            seed,
            log_filter: lookup("BLACKOUT_LOG").unwrap_or(defaults.log_filter),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = RuntimeConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, RuntimeConfig::default());
        assert_eq!(config.max_tricks, 7);
    }

    #[test]
    fn variables_override_defaults() {
        let config = RuntimeConfig::from_lookup(lookup_from(&[
            ("BLACKOUT_DATA_DIR", "/tmp/games"),
            ("BLACKOUT_SNAPSHOT_INTERVAL", "0"),
            ("BLACKOUT_MAX_TRICKS", "3"),
            ("BLACKOUT_SEED", "42"),
        ]))
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/games"));
        assert_eq!(config.snapshot_interval, 0);
        assert_eq!(config.max_tricks, 3);
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn bad_number_names_the_variable() {
        let err = RuntimeConfig::from_lookup(lookup_from(&[("BLACKOUT_SEED", "lots")]))
            .unwrap_err();
        assert!(err.to_string().contains("BLACKOUT_SEED"));
    }
}
