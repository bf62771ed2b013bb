//! Crypto engines.
//!
//! One provider trait per algorithm family. [`EngineRegistry`] holds the
//! engines present in this process; its names are the "available" set used
//! by the configuration check.

mod ed25519;
#[cfg(feature = "rsa")]
mod rustcrypto;

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

pub use ed25519::{DalekEd25519, ED25519_METHOD};
#[cfg(feature = "rsa")]
pub use rustcrypto::{RustCryptoRsa, RSA_PSS_SHA256_METHOD};

use crate::error::KeyResult;

/// RSA key generation and signing.
///
/// Keys are PEM text: SPKI / PKCS#8 on output, PKCS#1 also accepted on input.
pub trait RsaProvider: Send + Sync {
    /// Engine name, as used in [`crate::KeysConfig::rsa_engine`].
    fn name(&self) -> &str;

    /// Generate a key pair, returning `(public_pem, private_pem)`.
    fn generate_key_pair(&self, bits: usize) -> KeyResult<(String, String)>;

    /// Sign `data`, returning `(signature, method)`.
    fn sign(&self, private_pem: &str, data: &[u8]) -> KeyResult<(Vec<u8>, String)>;

    /// Verify `signature` over `data`.
    ///
    /// `Ok(false)` for a signature that does not match, including a public key
    /// that decodes but cannot verify anything (an off-curve Ed25519 point).
    /// `Err` for a method the engine does not implement, or for key material
    /// that cannot be decoded at all (bad PEM, wrong byte length).
    fn verify(
        &self,
        signature: &[u8],
        method: &str,
        public_pem: &str,
        data: &[u8],
    ) -> KeyResult<bool>;
}

/// Ed25519 key generation and signing over raw key bytes.
pub trait Ed25519Provider: Send + Sync {
    /// Engine name, as used in [`crate::KeysConfig::ed25519_engine`].
    fn name(&self) -> &str;

    /// Generate a key pair, returning `(public, private_seed)`.
    fn generate_key_pair(&self) -> KeyResult<([u8; 32], [u8; 32])>;

    /// Sign `data`, returning `(signature, method)`.
    fn sign(&self, public: &[u8], private: &[u8], data: &[u8]) -> KeyResult<(Vec<u8>, String)>;

    /// Verify `signature` over `data`. Same error contract as [`RsaProvider::verify`].
    fn verify(&self, public: &[u8], method: &str, signature: &[u8], data: &[u8])
        -> KeyResult<bool>;
}

/// Engines present in this process.
#[derive(Clone, Default)]
pub struct EngineRegistry {
    rsa: Vec<Arc<dyn RsaProvider>>,
    ed25519: Vec<Arc<dyn Ed25519Provider>>,
}

impl EngineRegistry {
    /// Registry with no engines.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with every engine compiled into this build.
    pub fn detect() -> Self {
        let registry = Self::empty()
            .with_ed25519_engine(Arc::new(DalekEd25519::new()))
            .with_ed25519_engine(Arc::new(DalekEd25519::strict()));

        #[cfg(feature = "rsa")]
        let registry = registry.with_rsa_engine(Arc::new(RustCryptoRsa::new()));

        tracing::debug!(engines = ?registry.available(), "detected crypto engines");
        registry
    }

    /// Add an RSA engine, replacing any engine with the same name.
    pub fn with_rsa_engine(mut self, engine: Arc<dyn RsaProvider>) -> Self {
        self.rsa.retain(|e| e.name() != engine.name());
        self.rsa.push(engine);
        self
    }

    /// Add an Ed25519 engine, replacing any engine with the same name.
    pub fn with_ed25519_engine(mut self, engine: Arc<dyn Ed25519Provider>) -> Self {
        self.ed25519.retain(|e| e.name() != engine.name());
        self.ed25519.push(engine);
        self
    }

    /// Names of all registered engines.
    pub fn available(&self) -> BTreeSet<String> {
        self.rsa
            .iter()
            .map(|e| e.name().to_string())
            .chain(self.ed25519.iter().map(|e| e.name().to_string()))
            .collect()
    }

    pub(crate) fn rsa(&self, name: &str) -> Option<&dyn RsaProvider> {
        self.rsa.iter().find(|e| e.name() == name).map(|e| &**e)
    }

    pub(crate) fn ed25519(&self, name: &str) -> Option<&dyn Ed25519Provider> {
        self.ed25519
            .iter()
            .find(|e| e.name() == name)
            .map(|e| &**e)
    }
}

impl fmt::Debug for EngineRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineRegistry")
            .field("available", &self.available())
            .finish()
    }
}

/// The engine selected for one key type.
#[derive(Clone, Copy)]
pub(crate) enum Engine<'a> {
    Rsa(&'a dyn RsaProvider),
    Ed25519(&'a dyn Ed25519Provider),
}

impl Engine<'_> {
    pub(crate) fn name(&self) -> &str {
        match self {
            Self::Rsa(engine) => engine.name(),
            Self::Ed25519(engine) => engine.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_registers_compiled_engines() {
        let available = EngineRegistry::detect().available();
        assert!(available.contains("dalek"));
        assert!(available.contains("dalek-strict"));
        assert_eq!(available.contains("rustcrypto"), cfg!(feature = "rsa"));
    }

    #[test]
    fn test_with_engine_replaces_same_name() {
        let registry = EngineRegistry::empty()
            .with_ed25519_engine(Arc::new(DalekEd25519::new()))
            .with_ed25519_engine(Arc::new(DalekEd25519::new()));
        assert_eq!(registry.ed25519.len(), 1);
        assert!(registry.ed25519("dalek").is_some());
        assert!(registry.ed25519("dalek-strict").is_none());
        assert!(registry.rsa("rustcrypto").is_none());
    }
}
