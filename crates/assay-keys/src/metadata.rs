//! Conversion between key records and their metadata form.

use crate::error::KeyResult;
use crate::formats::{check_keytype, check_keyval};
use crate::keyid::{compute_keyid, PublicKeyMetadata};
use crate::types::{KeyMetadata, KeyRecord, KeyType, KeyValue};

/// Build the metadata form of a key.
///
/// The private component is kept only when `include_private` is set and the
/// key actually has one; asking for the private half of a public-only key
/// returns the public-only form rather than failing.
pub fn to_metadata_format(
    keytype: &KeyType,
    keyval: &KeyValue,
    include_private: bool,
) -> KeyResult<KeyMetadata> {
    check_keytype(keytype)?;
    check_keyval(keytype, keyval)?;

    let keyval = if include_private && keyval.has_private() {
        keyval.clone()
    } else {
        KeyValue::public_only(keyval.public.clone())
    };

    Ok(KeyMetadata {
        keytype: keytype.clone(),
        keyval,
    })
}

/// Load a key from its metadata form, deriving its keyid.
pub fn from_metadata_format(metadata: &KeyMetadata) -> KeyResult<KeyRecord> {
    check_keytype(&metadata.keytype)?;
    check_keyval(&metadata.keytype, &metadata.keyval)?;

    let keyid = compute_keyid(&PublicKeyMetadata::new(
        &metadata.keytype,
        &metadata.keyval.public,
    ))?;

    Ok(KeyRecord::from_parts(
        metadata.keytype.clone(),
        keyid,
        metadata.keyval.clone(),
    ))
}
