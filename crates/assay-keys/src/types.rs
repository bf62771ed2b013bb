//! Key and signature records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{KeyError, KeyResult};
use crate::keyid::{compute_keyid, PublicKeyMetadata};

/// Key type tag.
///
/// Any well-formed tag deserializes; tags other than `rsa` and `ed25519`
/// land in [`KeyType::Other`] and are rejected at signing/verification time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum KeyType {
    Rsa,
    Ed25519,
    /// Any other tag. `rsa` and `ed25519` are rejected here by the shape checks.
    Other(String),
}

impl KeyType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Rsa => "rsa",
            Self::Ed25519 => "ed25519",
            Self::Other(tag) => tag,
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for KeyType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "rsa" => Self::Rsa,
            "ed25519" => Self::Ed25519,
            _ => Self::Other(tag),
        }
    }
}

impl From<&str> for KeyType {
    fn from(tag: &str) -> Self {
        Self::from(tag.to_string())
    }
}

impl From<KeyType> for String {
    fn from(keytype: KeyType) -> Self {
        match keytype {
            KeyType::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for KeyType {
    type Err = KeyError;

    fn from_str(s: &str) -> KeyResult<Self> {
        let keytype = Self::from(s);
        crate::formats::check_keytype(&keytype)?;
        Ok(keytype)
    }
}

/// Public/private key material.
///
/// PEM text for RSA, lowercase hex of the raw key bytes for Ed25519.
/// An empty `private` means the key is public-only.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub public: String,
    #[serde(default)]
    pub private: String,
}

impl KeyValue {
    pub fn new(public: impl Into<String>, private: impl Into<String>) -> Self {
        Self {
            public: public.into(),
            private: private.into(),
        }
    }

    pub fn public_only(public: impl Into<String>) -> Self {
        Self::new(public, String::new())
    }

    pub fn has_private(&self) -> bool {
        !self.private.is_empty()
    }
}

impl fmt::Debug for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let private = if self.has_private() { "<redacted>" } else { "" };
        f.debug_struct("KeyValue")
            .field("public", &self.public)
            .field("private", &private)
            .finish()
    }
}

/// Key as embedded in signed metadata documents (no keyid).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMetadata {
    pub keytype: KeyType,
    pub keyval: KeyValue,
}

/// A key with its derived keyid.
///
/// Only built through generation or [`crate::from_metadata_format`], so the
/// keyid always matches the public key material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "KeyRecordWire")]
pub struct KeyRecord {
    keytype: KeyType,
    keyid: String,
    keyval: KeyValue,
}

impl KeyRecord {
    /// Attach private material to a keyid derived beforehand from the public half.
    pub(crate) fn from_parts(keytype: KeyType, keyid: String, keyval: KeyValue) -> Self {
        Self {
            keytype,
            keyid,
            keyval,
        }
    }

    pub fn keytype(&self) -> &KeyType {
        &self.keytype
    }

    pub fn keyid(&self) -> &str {
        &self.keyid
    }

    pub fn keyval(&self) -> &KeyValue {
        &self.keyval
    }

    pub fn has_private(&self) -> bool {
        self.keyval.has_private()
    }

    /// Copy of this key without its private component. The keyid is unchanged.
    pub fn public_only(&self) -> Self {
        Self {
            keytype: self.keytype.clone(),
            keyid: self.keyid.clone(),
            keyval: KeyValue::public_only(self.keyval.public.clone()),
        }
    }

    /// Metadata form of this key, see [`crate::to_metadata_format`].
    pub fn to_metadata(&self, include_private: bool) -> KeyResult<KeyMetadata> {
        crate::metadata::to_metadata_format(&self.keytype, &self.keyval, include_private)
    }

    /// Whether `signature` claims to come from this key.
    ///
    /// Signature verification does not compare keyids; callers holding several
    /// keys use this to pick the right one first.
    pub fn is_signer_of(&self, signature: &SignatureRecord) -> bool {
        self.keyid == signature.keyid
    }
}

#[derive(Deserialize)]
struct KeyRecordWire {
    keytype: KeyType,
    keyid: String,
    keyval: KeyValue,
}

impl TryFrom<KeyRecordWire> for KeyRecord {
    type Error = KeyError;

    fn try_from(wire: KeyRecordWire) -> KeyResult<Self> {
        crate::formats::check_keyid(&wire.keyid)?;
        crate::formats::check_keytype(&wire.keytype)?;
        crate::formats::check_keyval(&wire.keytype, &wire.keyval)?;

        let derived = compute_keyid(&PublicKeyMetadata::new(&wire.keytype, &wire.keyval.public))?;
        if derived != wire.keyid {
            return Err(crate::error::format(
                "key record",
                format!("keyid mismatch: claimed {}, derived {}", wire.keyid, derived),
            ));
        }

        Ok(Self::from_parts(wire.keytype, derived, wire.keyval))
    }
}

/// A signature over some data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureRecord {
    /// Keyid of the signing key.
    pub keyid: String,

    /// Signature scheme identifier reported by the engine.
    pub method: String,

    /// Lowercase hex of the raw signature bytes.
    pub sig: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keytype_string_roundtrip() {
        assert_eq!(KeyType::from("rsa"), KeyType::Rsa);
        assert_eq!(KeyType::from("ed25519"), KeyType::Ed25519);
        assert_eq!(
            KeyType::from("bogus"),
            KeyType::Other("bogus".to_string())
        );
        assert_eq!(String::from(KeyType::Ed25519), "ed25519");
        assert_eq!(KeyType::Other("ecdsa".into()).to_string(), "ecdsa");
    }

    #[test]
    fn test_keytype_from_str_rejects_malformed_tag() {
        assert!("RSA!".parse::<KeyType>().is_err());
        assert_eq!("bogus".parse::<KeyType>().unwrap().as_str(), "bogus");
    }

    #[test]
    fn test_keyvalue_debug_redacts_private() {
        let keyval = KeyValue::new("aa".repeat(32), "bb".repeat(32));
        let debug = format!("{:?}", keyval);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains(&"bb".repeat(32)));
    }

    #[test]
    fn test_keyvalue_missing_private_defaults_empty() {
        let keyval: KeyValue = serde_json::from_str(r#"{"public": "abc"}"#).unwrap();
        assert!(!keyval.has_private());
    }

    #[test]
    fn test_key_record_wire_shape() {
        let keytype = KeyType::Ed25519;
        let public = "ab".repeat(32);
        let keyid = compute_keyid(&PublicKeyMetadata::new(&keytype, &public)).unwrap();
        let record = KeyRecord::from_parts(keytype, keyid.clone(), KeyValue::public_only(&public));

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["keytype"], "ed25519");
        assert_eq!(value["keyid"], keyid.as_str());
        assert_eq!(value["keyval"]["public"], public.as_str());
        assert_eq!(value["keyval"]["private"], "");

        let back: KeyRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_key_record_rejects_forged_keyid() {
        let json = serde_json::json!({
            "keytype": "ed25519",
            "keyid": "0".repeat(64),
            "keyval": {"public": "ab".repeat(32), "private": ""}
        });
        let err = serde_json::from_value::<KeyRecord>(json).unwrap_err();
        assert!(err.to_string().contains("keyid mismatch"), "{}", err);
    }
}
