//! Crypto engine selection.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{EngineCheck, EngineFamily, KeyError, KeyResult};

/// RSA engines this crate knows how to dispatch to.
pub const SUPPORTED_RSA_ENGINES: &[&str] = &["rustcrypto"];

/// Ed25519 engines this crate knows how to dispatch to.
pub const SUPPORTED_ED25519_ENGINES: &[&str] = &["dalek", "dalek-strict"];

/// Engine selection for key generation, signing and verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeysConfig {
    /// RSA engine name.
    #[serde(default = "default_rsa_engine")]
    pub rsa_engine: String,

    /// Ed25519 engine name.
    #[serde(default = "default_ed25519_engine")]
    pub ed25519_engine: String,
}

fn default_rsa_engine() -> String {
    "rustcrypto".to_string()
}

fn default_ed25519_engine() -> String {
    "dalek".to_string()
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            rsa_engine: default_rsa_engine(),
            ed25519_engine: default_ed25519_engine(),
        }
    }
}

impl KeysConfig {
    /// Create config from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `ASSAY_RSA_CRYPTO_ENGINE` | RSA engine (default: `rustcrypto`) |
    /// | `ASSAY_ED25519_CRYPTO_ENGINE` | Ed25519 engine (default: `dalek`) |
    pub fn from_env() -> Self {
        Self {
            rsa_engine: std::env::var("ASSAY_RSA_CRYPTO_ENGINE")
                .unwrap_or_else(|_| default_rsa_engine()),
            ed25519_engine: std::env::var("ASSAY_ED25519_CRYPTO_ENGINE")
                .unwrap_or_else(|_| default_ed25519_engine()),
        }
    }

    /// Set the RSA engine.
    pub fn with_rsa_engine(mut self, engine: impl Into<String>) -> Self {
        self.rsa_engine = engine.into();
        self
    }

    /// Set the Ed25519 engine.
    pub fn with_ed25519_engine(mut self, engine: impl Into<String>) -> Self {
        self.ed25519_engine = engine.into();
        self
    }

    /// Check both configured engines are supported and among `available`.
    ///
    /// Supported-set checks run before availability checks, RSA before Ed25519.
    pub fn check_engines(&self, available: &BTreeSet<String>) -> KeyResult<()> {
        check_supported(EngineFamily::Rsa, &self.rsa_engine, SUPPORTED_RSA_ENGINES)?;
        check_supported(
            EngineFamily::Ed25519,
            &self.ed25519_engine,
            SUPPORTED_ED25519_ENGINES,
        )?;
        check_available(EngineFamily::Rsa, &self.rsa_engine, available)?;
        check_available(EngineFamily::Ed25519, &self.ed25519_engine, available)
    }
}

fn check_supported(family: EngineFamily, engine: &str, supported: &[&str]) -> KeyResult<()> {
    if supported.contains(&engine) {
        return Ok(());
    }
    Err(KeyError::Configuration {
        family,
        engine: engine.to_string(),
        check: EngineCheck::Unsupported,
    })
}

fn check_available(
    family: EngineFamily,
    engine: &str,
    available: &BTreeSet<String>,
) -> KeyResult<()> {
    if available.contains(engine) {
        return Ok(());
    }
    Err(KeyError::Configuration {
        family,
        engine: engine.to_string(),
        check: EngineCheck::Unavailable,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn available(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_default_config_passes_with_all_engines() {
        let config = KeysConfig::default();
        assert!(config
            .check_engines(&available(&["rustcrypto", "dalek", "dalek-strict"]))
            .is_ok());
    }

    #[test]
    fn test_unsupported_rsa_engine() {
        let config = KeysConfig::default().with_rsa_engine("pycrypto");
        let err = config
            .check_engines(&available(&["rustcrypto", "dalek"]))
            .unwrap_err();
        assert_eq!(
            err,
            KeyError::Configuration {
                family: EngineFamily::Rsa,
                engine: "pycrypto".to_string(),
                check: EngineCheck::Unsupported,
            }
        );
    }

    #[test]
    fn test_unsupported_ed25519_engine() {
        let config = KeysConfig::default().with_ed25519_engine("pynacl");
        let err = config
            .check_engines(&available(&["rustcrypto", "dalek"]))
            .unwrap_err();
        assert!(matches!(
            err,
            KeyError::Configuration {
                family: EngineFamily::Ed25519,
                check: EngineCheck::Unsupported,
                ..
            }
        ));
    }

    #[test]
    fn test_supported_but_unavailable_engine() {
        let config = KeysConfig::default().with_ed25519_engine("dalek-strict");
        let err = config
            .check_engines(&available(&["rustcrypto", "dalek"]))
            .unwrap_err();
        assert_eq!(
            err,
            KeyError::Configuration {
                family: EngineFamily::Ed25519,
                engine: "dalek-strict".to_string(),
                check: EngineCheck::Unavailable,
            }
        );

        let err = KeysConfig::default()
            .check_engines(&available(&["dalek"]))
            .unwrap_err();
        assert!(matches!(
            err,
            KeyError::Configuration {
                family: EngineFamily::Rsa,
                check: EngineCheck::Unavailable,
                ..
            }
        ));
    }

    #[test]
    fn test_check_is_repeatable() {
        let config = KeysConfig::default();
        let engines = available(&["rustcrypto", "dalek"]);
        for _ in 0..3 {
            assert!(config.check_engines(&engines).is_ok());
        }
    }

    #[test]
    fn test_deserialize_defaults() {
        let config: KeysConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, KeysConfig::default());

        let config: KeysConfig =
            serde_json::from_str(r#"{"ed25519_engine": "dalek-strict"}"#).unwrap();
        assert_eq!(config.rsa_engine, "rustcrypto");
        assert_eq!(config.ed25519_engine, "dalek-strict");
    }

    #[test]
    #[serial]
    fn test_from_env() {
        std::env::set_var("ASSAY_ED25519_CRYPTO_ENGINE", "dalek-strict");
        std::env::remove_var("ASSAY_RSA_CRYPTO_ENGINE");
        let config = KeysConfig::from_env();
        std::env::remove_var("ASSAY_ED25519_CRYPTO_ENGINE");

        assert_eq!(config.rsa_engine, "rustcrypto");
        assert_eq!(config.ed25519_engine, "dalek-strict");
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        std::env::remove_var("ASSAY_RSA_CRYPTO_ENGINE");
        std::env::remove_var("ASSAY_ED25519_CRYPTO_ENGINE");
        assert_eq!(KeysConfig::from_env(), KeysConfig::default());
    }
}
