//! Signing keys for repository metadata.
//!
//! This crate provides the key layer used by signed metadata:
//!
//! - RSA (RSASSA-PSS / SHA-256) and Ed25519 key generation
//! - Deterministic keyids over the canonical JSON of the public key
//! - Conversion to and from the metadata key format
//! - Signature creation and verification through pluggable crypto engines
//!
//! # Quick Start
//!
//! ```
//! use assay_keys::{from_metadata_format, KeyService};
//!
//! # fn example() -> assay_keys::KeyResult<()> {
//! let keys = KeyService::from_env();
//!
//! let key = keys.generate_ed25519_key()?;
//! let signature = keys.create_signature(&key, b"The quick brown fox")?;
//!
//! // Verifiers only need the public half.
//! let published = key.to_metadata(false)?;
//! let verifier_key = from_metadata_format(&published)?;
//! assert_eq!(verifier_key.keyid(), key.keyid());
//! assert!(keys.verify_signature(&verifier_key, &signature, b"The quick brown fox")?);
//! # Ok(())
//! # }
//! ```
//!
//! # Keyids
//!
//! A keyid is the lowercase hex SHA-256 of the JCS-canonical JSON of the key
//! with its private half blanked. Two records with the same type and public
//! half always have the same keyid.
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `ASSAY_RSA_CRYPTO_ENGINE` | RSA engine (default: `rustcrypto`) |
//! | `ASSAY_ED25519_CRYPTO_ENGINE` | Ed25519 engine (default: `dalek`) |
//!
//! # Features
//!
//! - `rsa` (default): the `rustcrypto` RSA engine. Both configured engines are
//!   checked on every operation, so without this feature an RSA engine must be
//!   registered through [`EngineRegistry::with_rsa_engine`].

pub mod config;
pub mod engine;
pub mod error;
pub mod formats;
pub mod keyid;
pub mod metadata;
mod service;
pub mod types;

// Re-export main types
pub use config::{KeysConfig, SUPPORTED_ED25519_ENGINES, SUPPORTED_RSA_ENGINES};
pub use engine::{DalekEd25519, Ed25519Provider, EngineRegistry, RsaProvider, ED25519_METHOD};
#[cfg(feature = "rsa")]
pub use engine::{RustCryptoRsa, RSA_PSS_SHA256_METHOD};
pub use error::{EngineCheck, EngineFamily, KeyError, KeyResult};
pub use keyid::{compute_keyid, PublicKeyMetadata};
pub use metadata::{from_metadata_format, to_metadata_format};
pub use service::{KeyService, DEFAULT_RSA_KEY_BITS};
pub use types::{KeyMetadata, KeyRecord, KeyType, KeyValue, SignatureRecord};
