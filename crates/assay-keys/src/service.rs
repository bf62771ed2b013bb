//! Key generation and signature dispatch.

use crate::config::KeysConfig;
use crate::engine::{Ed25519Provider, Engine, EngineRegistry, RsaProvider};
use crate::error::{invalid_key_material, EngineCheck, EngineFamily, KeyError, KeyResult};
use crate::formats::{check_key_record, check_rsa_key_bits, check_signature};
use crate::keyid::{compute_keyid, PublicKeyMetadata};
use crate::types::{KeyRecord, KeyType, KeyValue, SignatureRecord};

/// RSA modulus size used when the caller has no preference.
pub const DEFAULT_RSA_KEY_BITS: usize = 3072;

/// Generates keys and creates/verifies signatures with the configured engines.
///
/// Holds no mutable state; clones share the same engines.
///
/// ```
/// use assay_keys::KeyService;
///
/// # fn example() -> assay_keys::KeyResult<()> {
/// let keys = KeyService::from_env();
/// let key = keys.generate_ed25519_key()?;
/// let signature = keys.create_signature(&key, b"payload")?;
/// assert!(keys.verify_signature(&key, &signature, b"payload")?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct KeyService {
    config: KeysConfig,
    engines: EngineRegistry,
}

impl KeyService {
    pub fn new(config: KeysConfig, engines: EngineRegistry) -> Self {
        Self { config, engines }
    }

    /// Service with engines selected from the environment and every engine
    /// compiled into this build.
    pub fn from_env() -> Self {
        Self::new(KeysConfig::from_env(), EngineRegistry::detect())
    }

    pub fn config(&self) -> &KeysConfig {
        &self.config
    }

    pub fn engines(&self) -> &EngineRegistry {
        &self.engines
    }

    /// Fail unless both configured engines are supported and available.
    pub fn check_engines(&self) -> KeyResult<()> {
        self.config.check_engines(&self.engines.available())
    }

    /// Generate an RSA key of `bits` bits (≥ 2048, multiple of 256).
    pub fn generate_rsa_key(&self, bits: usize) -> KeyResult<KeyRecord> {
        check_rsa_key_bits(bits)?;
        self.check_engines()?;

        let engine = self.rsa_engine()?;
        let (public, private) = engine.generate_key_pair(bits)?;

        let key = attach_private(KeyType::Rsa, public, private)?;
        tracing::debug!(keyid = %key.keyid(), bits, engine = engine.name(), "generated rsa key");
        Ok(key)
    }

    /// Generate an RSA key of [`DEFAULT_RSA_KEY_BITS`] bits.
    pub fn generate_default_rsa_key(&self) -> KeyResult<KeyRecord> {
        self.generate_rsa_key(DEFAULT_RSA_KEY_BITS)
    }

    /// Generate an Ed25519 key; both halves are stored as lowercase hex.
    pub fn generate_ed25519_key(&self) -> KeyResult<KeyRecord> {
        self.check_engines()?;

        let engine = self.ed25519_engine()?;
        let (public, private) = engine.generate_key_pair()?;

        let key = attach_private(KeyType::Ed25519, hex::encode(public), hex::encode(private))?;
        tracing::debug!(keyid = %key.keyid(), engine = engine.name(), "generated ed25519 key");
        Ok(key)
    }

    /// Sign `data` with the private half of `key`.
    pub fn create_signature(&self, key: &KeyRecord, data: &[u8]) -> KeyResult<SignatureRecord> {
        check_key_record(key)?;
        self.check_engines()?;

        if !key.has_private() {
            return Err(KeyError::MissingPrivateKey {
                keyid: key.keyid().to_string(),
            });
        }

        let engine = self.engine_for(key.keytype())?;
        let (sig, method) =
            sign_with(engine, key, data).inspect_err(|e| warn_rejected(key, engine, e))?;

        tracing::debug!(
            keyid = %key.keyid(),
            keytype = %key.keytype(),
            method = %method,
            engine = engine.name(),
            "created signature"
        );

        Ok(SignatureRecord {
            keyid: key.keyid().to_string(),
            method,
            sig: hex::encode(sig),
        })
    }

    /// Check `signature` over `data` against the public half of `key`.
    ///
    /// Returns `Ok(false)` when the signature does not match. The signature's
    /// keyid is not compared with the key's; see [`KeyRecord::is_signer_of`].
    pub fn verify_signature(
        &self,
        key: &KeyRecord,
        signature: &SignatureRecord,
        data: &[u8],
    ) -> KeyResult<bool> {
        check_key_record(key)?;
        check_signature(signature)?;
        self.check_engines()?;

        let sig = hex::decode(&signature.sig)
            .map_err(|e| crate::error::format("signature", e.to_string()))?;
        let engine = self.engine_for(key.keytype())?;
        let valid = verify_with(engine, key, &signature.method, &sig, data)
            .inspect_err(|e| warn_rejected(key, engine, e))?;

        tracing::debug!(
            keyid = %key.keyid(),
            keytype = %key.keytype(),
            method = %signature.method,
            engine = engine.name(),
            valid,
            "verified signature"
        );
        Ok(valid)
    }

    /// Select the engine for `keytype`.
    ///
    /// Each family uses its own configured engine; this is the only place
    /// key types map to engines.
    fn engine_for(&self, keytype: &KeyType) -> KeyResult<Engine<'_>> {
        match keytype {
            KeyType::Rsa => self.rsa_engine().map(Engine::Rsa),
            KeyType::Ed25519 => self.ed25519_engine().map(Engine::Ed25519),
            KeyType::Other(tag) => Err(KeyError::UnsupportedKeyType {
                keytype: tag.clone(),
            }),
        }
    }

    fn rsa_engine(&self) -> KeyResult<&dyn RsaProvider> {
        let name = &self.config.rsa_engine;
        self.engines
            .rsa(name)
            .ok_or_else(|| unavailable(EngineFamily::Rsa, name))
    }

    fn ed25519_engine(&self) -> KeyResult<&dyn Ed25519Provider> {
        let name = &self.config.ed25519_engine;
        self.engines
            .ed25519(name)
            .ok_or_else(|| unavailable(EngineFamily::Ed25519, name))
    }
}

fn unavailable(family: EngineFamily, engine: &str) -> KeyError {
    KeyError::Configuration {
        family,
        engine: engine.to_string(),
        check: EngineCheck::Unavailable,
    }
}

fn sign_with(engine: Engine<'_>, key: &KeyRecord, data: &[u8]) -> KeyResult<(Vec<u8>, String)> {
    let keyval = key.keyval();
    match engine {
        Engine::Rsa(rsa) => rsa.sign(&keyval.private, data),
        Engine::Ed25519(ed25519) => {
            let public = decode_hex_key(key.keytype(), "public key", &keyval.public)?;
            let private = decode_hex_key(key.keytype(), "private key", &keyval.private)?;
            ed25519.sign(&public, &private, data)
        }
    }
}

fn verify_with(
    engine: Engine<'_>,
    key: &KeyRecord,
    method: &str,
    sig: &[u8],
    data: &[u8],
) -> KeyResult<bool> {
    let public = &key.keyval().public;
    match engine {
        Engine::Rsa(rsa) => rsa.verify(sig, method, public, data),
        Engine::Ed25519(ed25519) => {
            let public = decode_hex_key(key.keytype(), "public key", public)?;
            ed25519.verify(&public, method, sig, data)
        }
    }
}

fn warn_rejected(key: &KeyRecord, engine: Engine<'_>, err: &KeyError) {
    if let KeyError::InvalidKeyMaterial { reason, .. } = err {
        tracing::warn!(
            keyid = %key.keyid(),
            keytype = %key.keytype(),
            engine = engine.name(),
            reason = %reason,
            "crypto engine rejected key material"
        );
    }
}

/// Derive the keyid from the public half, then build the full record.
fn attach_private(keytype: KeyType, public: String, private: String) -> KeyResult<KeyRecord> {
    let keyid = compute_keyid(&PublicKeyMetadata::new(&keytype, &public))?;
    Ok(KeyRecord::from_parts(
        keytype,
        keyid,
        KeyValue::new(public, private),
    ))
}

fn decode_hex_key(keytype: &KeyType, what: &str, text: &str) -> KeyResult<Vec<u8>> {
    hex::decode(text).map_err(|e| invalid_key_material(keytype.as_str(), format!("{}: {}", what, e)))
}
