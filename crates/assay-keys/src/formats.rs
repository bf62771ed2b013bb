//! Shape checks for key and signature inputs.
//!
//! Every public operation runs these before any cryptographic work, so a
//! malformed input always fails with [`KeyError::Format`](crate::KeyError::Format)
//! and never halfway through an operation.

use crate::error::{format, KeyResult};
use crate::types::{KeyRecord, KeyType, KeyValue, SignatureRecord};

/// Smallest RSA modulus accepted for generation.
pub const MIN_RSA_KEY_BITS: usize = 2048;

/// RSA modulus sizes must be a multiple of this.
pub const RSA_KEY_BITS_STEP: usize = 256;

/// Length of a keyid (hex SHA-256).
pub const KEYID_HEX_LEN: usize = 64;

/// Length of a hex-encoded Ed25519 public key or private seed.
pub const ED25519_KEY_HEX_LEN: usize = 64;

const MAX_KEYTYPE_LEN: usize = 64;

const PEM_BEGIN: &str = "-----BEGIN ";

pub fn check_rsa_key_bits(bits: usize) -> KeyResult<()> {
    if bits < MIN_RSA_KEY_BITS {
        return Err(format(
            "RSA key bits",
            format!("{} is below the minimum of {}", bits, MIN_RSA_KEY_BITS),
        ));
    }
    if bits % RSA_KEY_BITS_STEP != 0 {
        return Err(format(
            "RSA key bits",
            format!("{} is not a multiple of {}", bits, RSA_KEY_BITS_STEP),
        ));
    }
    Ok(())
}

/// Key type tags are short lowercase identifiers (`rsa`, `ed25519`, ...).
pub fn check_keytype(keytype: &KeyType) -> KeyResult<()> {
    let tag = keytype.as_str();
    if tag.is_empty() || tag.len() > MAX_KEYTYPE_LEN {
        return Err(format("key type", format!("bad length {}", tag.len())));
    }
    let well_formed = tag
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_');
    if !well_formed {
        return Err(format("key type", format!("{:?} is not a lowercase tag", tag)));
    }
    // Known tags must use their own variant so dispatch and equality agree.
    if let KeyType::Other(tag) = keytype {
        if matches!(KeyType::from(tag.as_str()), KeyType::Rsa | KeyType::Ed25519) {
            return Err(format("key type", format!("{:?} must not be an `Other` tag", tag)));
        }
    }
    Ok(())
}

/// Check a key value against the rules for its key type.
///
/// Unknown key types only need a non-empty public component; the specific
/// encodings are checked for `rsa` (PEM) and `ed25519` (64 hex chars).
pub fn check_keyval(keytype: &KeyType, keyval: &KeyValue) -> KeyResult<()> {
    if keyval.public.is_empty() {
        return Err(format("key value", "public key is empty"));
    }

    match keytype {
        KeyType::Rsa => {
            check_pem("RSA public key", &keyval.public)?;
            if keyval.has_private() {
                check_pem("RSA private key", &keyval.private)?;
            }
        }
        KeyType::Ed25519 => {
            check_fixed_hex("Ed25519 public key", &keyval.public, ED25519_KEY_HEX_LEN)?;
            if keyval.has_private() {
                check_fixed_hex("Ed25519 private key", &keyval.private, ED25519_KEY_HEX_LEN)?;
            }
        }
        KeyType::Other(_) => {}
    }
    Ok(())
}

pub fn check_keyid(keyid: &str) -> KeyResult<()> {
    check_fixed_hex("keyid", keyid, KEYID_HEX_LEN)
}

pub fn check_key_record(key: &KeyRecord) -> KeyResult<()> {
    check_keytype(key.keytype())?;
    check_keyid(key.keyid())?;
    check_keyval(key.keytype(), key.keyval())
}

pub fn check_signature(signature: &SignatureRecord) -> KeyResult<()> {
    check_keyid(&signature.keyid)?;
    if signature.method.is_empty() {
        return Err(format("signature", "method is empty"));
    }
    if signature.sig.is_empty() || signature.sig.len() % 2 != 0 {
        return Err(format(
            "signature",
            format!("sig must be non-empty even-length hex, got {} chars", signature.sig.len()),
        ));
    }
    check_hex("signature", &signature.sig)
}

fn check_pem(what: &'static str, text: &str) -> KeyResult<()> {
    if !text.trim_start().starts_with(PEM_BEGIN) {
        return Err(format(what, "not PEM encoded"));
    }
    Ok(())
}

fn check_fixed_hex(what: &'static str, text: &str, len: usize) -> KeyResult<()> {
    if text.len() != len {
        return Err(format(
            what,
            format!("expected {} hex chars, got {}", len, text.len()),
        ));
    }
    check_hex(what, text)
}

fn check_hex(what: &'static str, text: &str) -> KeyResult<()> {
    if !text.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
        return Err(format(what, "must be lowercase hex"));
    }
    Ok(())
}
