//! Hex helpers shared by every playground.
//!
//! All byte values are shown to the user as lowercase hex. Parsing is lenient
//! about surrounding whitespace and an optional `0x` prefix, since roots copied
//! from Ethereum tooling usually carry one.

use crate::error::PlaygroundError;

/// Decode a user supplied hex string.
pub fn decode_hex(field: &'static str, value: &str) -> Result<Vec<u8>, PlaygroundError> {
    let trimmed = value.trim();
    let trimmed = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    hex::decode(trimmed).map_err(|err| PlaygroundError::InvalidHex {
        field,
        reason: err.to_string(),
    })
}

/// Decode hex into a fixed size array.
pub fn decode_hex_array<const N: usize>(
    field: &'static str,
    value: &str,
) -> Result<[u8; N], PlaygroundError> {
    let bytes = decode_hex(field, value)?;
    <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| PlaygroundError::InvalidLength {
        field,
        expected: N,
        actual: bytes.len(),
    })
}

/// Serde adapter storing 32-byte digests as hex strings.
pub mod serde_digest {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(digest: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(digest))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 32], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::decode_hex_array::<32>("digest", &s).map_err(D::Error::custom)
    }
}

/// Serde adapter storing arbitrary byte strings as hex.
pub mod serde_bytes {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::decode_hex("bytes", &s).map_err(D::Error::custom)
    }
}
