//! Error types for key handling.

use std::fmt;

/// Crypto engine family named in a configuration error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineFamily {
    Rsa,
    Ed25519,
}

impl fmt::Display for EngineFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rsa => f.write_str("rsa"),
            Self::Ed25519 => f.write_str("ed25519"),
        }
    }
}

/// Which part of the engine availability check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCheck {
    /// The configured engine is not in the supported set for its family.
    Unsupported,
    /// The configured engine is supported but was not detected at startup.
    Unavailable,
}

impl fmt::Display for EngineCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported => f.write_str("is not supported"),
            Self::Unavailable => f.write_str("is not available"),
        }
    }
}

/// Key errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    /// Input does not have the expected shape.
    #[error("invalid {what}: {reason}")]
    Format { what: &'static str, reason: String },

    /// Configured crypto engine is unsupported or unavailable.
    #[error("{family} crypto engine {engine:?} {check}")]
    Configuration {
        family: EngineFamily,
        engine: String,
        check: EngineCheck,
    },

    /// Key type is well-formed but has no signing implementation.
    #[error("unsupported key type: {keytype}")]
    UnsupportedKeyType { keytype: String },

    /// Signing requested on a public-only key.
    #[error("no private key available for signing (keyid {keyid})")]
    MissingPrivateKey { keyid: String },

    /// Signature method is not implemented by the selected engine.
    #[error("unknown signature method {method:?} for engine {engine}")]
    UnknownMethod { engine: String, method: String },

    /// Key text passed shape checks but could not be used by the engine.
    #[error("invalid {keytype} key material: {reason}")]
    InvalidKeyMaterial { keytype: String, reason: String },

    /// Engine failed to generate a key or produce a signature.
    #[error("crypto engine failure: {reason}")]
    Crypto { reason: String },

    /// Canonical encoding of a key failed.
    #[error("canonicalization failed: {message}")]
    Canonicalize { message: String },
}

impl KeyError {
    /// Whether the error was raised by input validation.
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format { .. })
    }
}

/// Result type for key operations.
pub type KeyResult<T> = Result<T, KeyError>;

pub(crate) fn format(what: &'static str, reason: impl Into<String>) -> KeyError {
    KeyError::Format {
        what,
        reason: reason.into(),
    }
}

pub(crate) fn invalid_key_material(keytype: &str, reason: impl fmt::Display) -> KeyError {
    KeyError::InvalidKeyMaterial {
        keytype: keytype.to_string(),
        reason: reason.to_string(),
    }
}

pub(crate) fn crypto(reason: impl fmt::Display) -> KeyError {
    KeyError::Crypto {
        reason: reason.to_string(),
    }
}

pub(crate) fn unknown_method(engine: &str, method: &str) -> KeyError {
    KeyError::UnknownMethod {
        engine: engine.to_string(),
        method: method.to_string(),
    }
}
