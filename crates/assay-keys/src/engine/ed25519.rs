//! Ed25519 engines on `ed25519-dalek`.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

use super::Ed25519Provider;
use crate::error::{crypto, invalid_key_material, unknown_method, KeyResult};

/// Method identifier for Ed25519 signatures.
pub const ED25519_METHOD: &str = "ed25519";

/// Ed25519 engine.
///
/// `dalek` verifies with the RFC 8032 cofactorless check; `dalek-strict`
/// additionally rejects weak public keys and non-canonical signatures.
/// Signatures produced by either engine are identical.
#[derive(Debug, Clone, Copy)]
pub struct DalekEd25519 {
    strict: bool,
}

impl DalekEd25519 {
    pub fn new() -> Self {
        Self { strict: false }
    }

    pub fn strict() -> Self {
        Self { strict: true }
    }
}

impl Default for DalekEd25519 {
    fn default() -> Self {
        Self::new()
    }
}

fn key_bytes(what: &str, bytes: &[u8]) -> KeyResult<[u8; 32]> {
    bytes.try_into().map_err(|_| {
        invalid_key_material(
            "ed25519",
            format!("{} must be 32 bytes, got {}", what, bytes.len()),
        )
    })
}

impl Ed25519Provider for DalekEd25519 {
    fn name(&self) -> &str {
        if self.strict {
            "dalek-strict"
        } else {
            "dalek"
        }
    }

    fn generate_key_pair(&self) -> KeyResult<([u8; 32], [u8; 32])> {
        let signing_key = SigningKey::generate(&mut rand::thread_rng());
        Ok((signing_key.verifying_key().to_bytes(), signing_key.to_bytes()))
    }

    fn sign(&self, public: &[u8], private: &[u8], data: &[u8]) -> KeyResult<(Vec<u8>, String)> {
        let public = key_bytes("public key", public)?;
        let signing_key = SigningKey::from_bytes(&key_bytes("private key", private)?);

        // A seed paired with someone else's public key would sign under the
        // wrong identity.
        if signing_key.verifying_key().to_bytes() != public {
            return Err(invalid_key_material(
                "ed25519",
                "public key does not match private key",
            ));
        }

        let signature = signing_key
            .try_sign(data)
            .map_err(|e| crypto(format!("ed25519 signing failed: {}", e)))?;
        Ok((signature.to_bytes().to_vec(), ED25519_METHOD.to_string()))
    }

    fn verify(
        &self,
        public: &[u8],
        method: &str,
        signature: &[u8],
        data: &[u8],
    ) -> KeyResult<bool> {
        if method != ED25519_METHOD {
            return Err(unknown_method(self.name(), method));
        }

        // Off-curve public key: no signature can match.
        let Ok(verifying_key) = VerifyingKey::from_bytes(&key_bytes("public key", public)?) else {
            return Ok(false);
        };

        let Ok(signature) = Signature::from_slice(signature) else {
            return Ok(false);
        };

        let valid = if self.strict {
            verifying_key.verify_strict(data, &signature).is_ok()
        } else {
            verifying_key.verify(data, &signature).is_ok()
        };
        Ok(valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KeyError;

    const DATA: &[u8] = b"The quick brown fox jumps over the lazy dog";

    #[test]
    fn test_sign_verify_roundtrip() {
        for engine in [DalekEd25519::new(), DalekEd25519::strict()] {
            let (public, private) = engine.generate_key_pair().unwrap();
            let (sig, method) = engine.sign(&public, &private, DATA).unwrap();

            assert_eq!(sig.len(), 64);
            assert_eq!(method, ED25519_METHOD);
            assert!(engine.verify(&public, &method, &sig, DATA).unwrap());
            assert!(!engine.verify(&public, &method, &sig, b"bad_data").unwrap());
        }
    }

    #[test]
    fn test_rfc8032_test_vector_1() {
        // RFC 8032 §7.1, TEST 1 (empty message).
        let seed =
            hex::decode("9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60")
                .unwrap();
        let public =
            hex::decode("d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a")
                .unwrap();
        let engine = DalekEd25519::new();
        let (sig, _) = engine.sign(&public, &seed, b"").unwrap();
        assert_eq!(
            hex::encode(&sig),
            "e5564300c360ac729086e2cc806e828a84877f1eb8e5d974d873e06522490155\
             5fb8821590a33bacc61e39701cf9b46bd25bf5f0595bbe24655141438e7a100b"
        );
    }

    #[test]
    fn test_verify_wrong_length_signature_is_false() {
        let engine = DalekEd25519::new();
        let (public, _) = engine.generate_key_pair().unwrap();
        assert!(!engine.verify(&public, ED25519_METHOD, &[0u8; 10], DATA).unwrap());
    }

    #[test]
    fn test_verify_with_off_curve_public_key_is_false() {
        let engine = DalekEd25519::new();
        let (public, private) = engine.generate_key_pair().unwrap();
        let (sig, method) = engine.sign(&public, &private, DATA).unwrap();

        // Roughly half of all y-coordinates have no point on the curve.
        let off_curve = (0..=u8::MAX)
            .map(|b| [b; 32])
            .find(|bytes| VerifyingKey::from_bytes(bytes).is_err())
            .unwrap();
        for engine in [DalekEd25519::new(), DalekEd25519::strict()] {
            assert!(!engine.verify(&off_curve, &method, &sig, DATA).unwrap());
        }
    }

    #[test]
    fn test_verify_unknown_method_is_error() {
        let engine = DalekEd25519::strict();
        let (public, private) = engine.generate_key_pair().unwrap();
        let (sig, _) = engine.sign(&public, &private, DATA).unwrap();

        let err = engine.verify(&public, "rsassa-pss-sha256", &sig, DATA).unwrap_err();
        assert_eq!(
            err,
            KeyError::UnknownMethod {
                engine: "dalek-strict".to_string(),
                method: "rsassa-pss-sha256".to_string(),
            }
        );
    }

    #[test]
    fn test_sign_rejects_mismatched_public_key() {
        let engine = DalekEd25519::new();
        let (_, private) = engine.generate_key_pair().unwrap();
        let (other_public, _) = engine.generate_key_pair().unwrap();

        let err = engine.sign(&other_public, &private, DATA).unwrap_err();
        assert!(matches!(err, KeyError::InvalidKeyMaterial { .. }));
    }

    #[test]
    fn test_names() {
        assert_eq!(DalekEd25519::new().name(), "dalek");
        assert_eq!(DalekEd25519::strict().name(), "dalek-strict");
    }
}
