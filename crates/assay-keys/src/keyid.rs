//! Keyid derivation.
//!
//! ```text
//! keyid = hex(SHA256(JCS({"keytype": T, "keyval": {"private": "", "public": P}})))
//! ```
//!
//! The canonical form is the metadata form of the key with the private
//! component blanked. [`compute_keyid`] only accepts [`PublicKeyMetadata`],
//! which has no private field, so private material cannot reach the hash.

use serde::ser::{Serialize, SerializeStruct, Serializer};
use sha2::{Digest, Sha256};

use crate::error::{KeyError, KeyResult};
use crate::types::KeyType;

/// Public-only projection of a key, the input to keyid derivation.
#[derive(Debug, Clone, Copy)]
pub struct PublicKeyMetadata<'a> {
    keytype: &'a KeyType,
    public: &'a str,
}

impl<'a> PublicKeyMetadata<'a> {
    pub fn new(keytype: &'a KeyType, public: &'a str) -> Self {
        Self { keytype, public }
    }
}

impl Serialize for PublicKeyMetadata<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("KeyMetadata", 2)?;
        state.serialize_field("keytype", self.keytype.as_str())?;
        state.serialize_field("keyval", &PublicKeyValue(self.public))?;
        state.end()
    }
}

struct PublicKeyValue<'a>(&'a str);

impl Serialize for PublicKeyValue<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("KeyValue", 2)?;
        state.serialize_field("public", self.0)?;
        state.serialize_field("private", "")?;
        state.end()
    }
}

/// Canonical (JCS, RFC 8785) bytes of the public-only key.
pub fn canonical_key_bytes(key: &PublicKeyMetadata<'_>) -> KeyResult<Vec<u8>> {
    serde_jcs::to_vec(key).map_err(|e| KeyError::Canonicalize {
        message: e.to_string(),
    })
}

/// Compute the keyid of a key: lowercase hex SHA-256 of its canonical bytes.
pub fn compute_keyid(key: &PublicKeyMetadata<'_>) -> KeyResult<String> {
    let canonical = canonical_key_bytes(key)?;

    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    Ok(hex::encode(hasher.finalize()))
}
