//! Environment configuration.
//!
//! Every setting has a default, so an empty environment yields a working
//! read-only configuration. Submitting and revealing additionally need a
//! wallet seed.

use std::path::PathBuf;
use std::time::Duration;

use witness_crypto::{Ed25519KeyPair, DEFAULT_TOLERANCE};
use witness_reveal::{LocalWallet, StaticChain, DEFAULT_DURATION_DAYS, DEFAULT_REVEAL_DELAY};
use witness_store::DirStore;
use witness_testimony::ContradictionAnalyzer;
use zeroize::Zeroizing;

/// Default contract address when none is configured.
pub const DEFAULT_CONTRACT_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Sepolia.
pub const DEFAULT_CHAIN_ID: u64 = 11155111;

pub const DEFAULT_STORE_DIR: &str = ".witness-store";

/// Runtime configuration for the `witness` binary.
///
/// Custom `Debug` implementation redacts the wallet seed.
#[derive(Clone)]
pub struct WitnessConfig {
    /// Root directory of the testimony store.
    pub store_dir: PathBuf,
    /// Contract address reported by the store and bound into challenges.
    pub contract_address: String,
    pub chain_id: u64,
    /// Contradiction tolerance in percentage points.
    pub tolerance: f64,
    pub reveal_delay: Duration,
    /// Validity window of a reveal session.
    pub duration_days: u32,
    /// Hex Ed25519 seed of the connected wallet.
    pub wallet_seed: Option<Zeroizing<String>>,
}

impl std::fmt::Debug for WitnessConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WitnessConfig")
            .field("store_dir", &self.store_dir)
            .field("contract_address", &self.contract_address)
            .field("chain_id", &self.chain_id)
            .field("tolerance", &self.tolerance)
            .field("reveal_delay", &self.reveal_delay)
            .field("duration_days", &self.duration_days)
            .field(
                "wallet_seed",
                &self.wallet_seed.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl Default for WitnessConfig {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from(DEFAULT_STORE_DIR),
            contract_address: DEFAULT_CONTRACT_ADDRESS.to_string(),
            chain_id: DEFAULT_CHAIN_ID,
            tolerance: DEFAULT_TOLERANCE,
            reveal_delay: DEFAULT_REVEAL_DELAY,
            duration_days: DEFAULT_DURATION_DAYS,
            wallet_seed: None,
        }
    }
}

impl WitnessConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `WITNESS_STORE_DIR` (default: `.witness-store`)
    /// - `WITNESS_CONTRACT_ADDRESS` (default: the zero address)
    /// - `WITNESS_CHAIN_ID` (default: 11155111)
    /// - `WITNESS_TOLERANCE` (default: 10)
    /// - `WITNESS_REVEAL_DELAY_MS` (default: 1500)
    /// - `WITNESS_DURATION_DAYS` (default: 30)
    /// - `WITNESS_WALLET_SEED` (optional, 64 hex digits)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let tolerance = parse_var(&lookup, "WITNESS_TOLERANCE", defaults.tolerance)?;
        if !(tolerance.is_finite() && tolerance > 0.0) {
            return Err(ConfigError::Invalid {
                var: "WITNESS_TOLERANCE".to_string(),
                reason: format!("must be a positive number, got {tolerance}"),
            });
        }
        let reveal_delay_ms = parse_var(
            &lookup,
            "WITNESS_REVEAL_DELAY_MS",
            defaults.reveal_delay.as_millis() as u64,
        )?;
        let wallet_seed = lookup("WITNESS_WALLET_SEED")
            .map(Zeroizing::new)
            .filter(|seed| !seed.trim().is_empty());

        let config = Self {
            store_dir: lookup("WITNESS_STORE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.store_dir),
            contract_address: lookup("WITNESS_CONTRACT_ADDRESS")
                .unwrap_or(defaults.contract_address),
            chain_id: parse_var(&lookup, "WITNESS_CHAIN_ID", defaults.chain_id)?,
            tolerance,
            reveal_delay: Duration::from_millis(reveal_delay_ms),
            duration_days: parse_var(&lookup, "WITNESS_DURATION_DAYS", defaults.duration_days)?,
            wallet_seed,
        };
        // Malformed seeds are rejected at load time.
        config.wallet()?;
        Ok(config)
    }

    /// The testimony store. Not created until the first write.
    pub fn store(&self) -> DirStore {
        DirStore::open(&self.store_dir, &self.contract_address)
    }

    /// The configured wallet, or a disconnected one when no seed is set.
    pub fn wallet(&self) -> Result<LocalWallet, ConfigError> {
        match &self.wallet_seed {
            Some(seed) => Ed25519KeyPair::from_seed_hex(seed)
                .map(LocalWallet::new)
                .map_err(|e| ConfigError::Invalid {
                    var: "WITNESS_WALLET_SEED".to_string(),
                    reason: e.to_string(),
                }),
            None => Ok(LocalWallet::disconnected()),
        }
    }

    pub fn chain(&self) -> StaticChain {
        StaticChain(self.chain_id)
    }

    pub fn analyzer(&self) -> ContradictionAnalyzer {
        ContradictionAnalyzer::new(witness_crypto::MarkerCodec, self.tolerance)
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var: var.to_string(),
            reason: format!("{raw:?}: {e}"),
        }),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: String, reason: String },
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
        move |var| map.get(var).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let cfg = WitnessConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.store_dir, PathBuf::from(".witness-store"));
        assert_eq!(cfg.contract_address, DEFAULT_CONTRACT_ADDRESS);
        assert_eq!(cfg.chain_id, 11155111);
        assert_eq!(cfg.tolerance, 10.0);
        assert_eq!(cfg.reveal_delay, Duration::from_millis(1500));
        assert_eq!(cfg.duration_days, 30);
        assert!(cfg.wallet_seed.is_none());
        assert!(!cfg.wallet().unwrap().is_connected());
    }

    #[test]
    fn overrides_are_parsed() {
        let seed = "ab".repeat(32);
        let cfg = WitnessConfig::from_lookup(lookup(&[
            ("WITNESS_STORE_DIR", "/var/lib/witness"),
            ("WITNESS_CHAIN_ID", "1"),
            ("WITNESS_TOLERANCE", "2.5"),
            ("WITNESS_REVEAL_DELAY_MS", "0"),
            ("WITNESS_DURATION_DAYS", " 7 "),
            ("WITNESS_WALLET_SEED", seed.as_str()),
        ]))
        .unwrap();
        assert_eq!(cfg.store_dir, PathBuf::from("/var/lib/witness"));
        assert_eq!(cfg.chain_id, 1);
        assert_eq!(cfg.tolerance, 2.5);
        assert_eq!(cfg.reveal_delay, Duration::ZERO);
        assert_eq!(cfg.duration_days, 7);
        assert!(cfg.wallet().unwrap().is_connected());
    }

    #[test]
    fn bad_values_are_rejected() {
        for pairs in [
            [("WITNESS_CHAIN_ID", "sepolia")],
            [("WITNESS_TOLERANCE", "0")],
            [("WITNESS_TOLERANCE", "NaN")],
            [("WITNESS_REVEAL_DELAY_MS", "-1")],
            [("WITNESS_WALLET_SEED", "not-hex")],
        ] {
            let err = WitnessConfig::from_lookup(lookup(&pairs)).unwrap_err();
            assert!(err.to_string().contains(pairs[0].0), "{err}");
        }
    }

    #[test]
    fn debug_redacts_seed() {
        let seed = "cd".repeat(32);
        let cfg = WitnessConfig::from_lookup(lookup(&[("WITNESS_WALLET_SEED", seed.as_str())])).unwrap();
        let debug = format!("{cfg:?}");
        assert!(!debug.contains(&seed));
        assert!(debug.contains("[REDACTED]"));
    }
}
