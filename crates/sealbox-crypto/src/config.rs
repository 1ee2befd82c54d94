//! Configuration for the key managers.
//!
//! Resolution order (later wins):
//! 1. Built-in defaults
//! 2. JSON config file, when a path is given
//! 3. Environment variables (`SEALBOX_RSA_MODULUS_BITS`)

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::asymmetric::DEFAULT_MODULUS_BITS;
use crate::error::CryptoError;

/// RSA modulus sizes accepted for generation.
pub const ALLOWED_MODULUS_BITS: [usize; 3] = [2048, 3072, 4096];

const ENV_MODULUS_BITS: &str = "SEALBOX_RSA_MODULUS_BITS";

/// Complete crypto configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CryptoConfig {
    #[serde(default)]
    pub asymmetric: AsymmetricConfig,
}

/// RSA key pair settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AsymmetricConfig {
    pub modulus_bits: usize,
}

impl Default for AsymmetricConfig {
    fn default() -> Self {
        Self {
            modulus_bits: DEFAULT_MODULUS_BITS,
        }
    }
}

impl CryptoConfig {
    /// Reject settings the key managers cannot honor.
    pub fn validate(&self) -> Result<(), CryptoError> {
        let bits = self.asymmetric.modulus_bits;
        if !ALLOWED_MODULUS_BITS.contains(&bits) {
            return Err(CryptoError::Config(format!(
                "unsupported RSA modulus size {bits}, expected one of {ALLOWED_MODULUS_BITS:?}"
            )));
        }
        Ok(())
    }
}

/// Load configuration from defaults, an optional JSON file and the
/// environment, then validate it.
pub fn load_config(path: Option<&Path>) -> Result<CryptoConfig, CryptoError> {
    let mut config = match path {
        Some(path) => load_config_file(path)?,
        None => CryptoConfig::default(),
    };
    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    config.validate()?;
    Ok(config)
}

fn load_config_file(path: &Path) -> Result<CryptoConfig, CryptoError> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| {
        CryptoError::Config(format!(
            "Failed to parse config file {}: {}",
            path.display(),
            e
        ))
    })
}

fn apply_env_overrides(
    config: &mut CryptoConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), CryptoError> {
    if let Some(val) = lookup(ENV_MODULUS_BITS) {
        config.asymmetric.modulus_bits = val.trim().parse().map_err(|_| {
            CryptoError::Config(format!("{ENV_MODULUS_BITS} is not a number: {val:?}"))
        })?;
    }
    Ok(())
}
