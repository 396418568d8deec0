use serde::{Deserialize, Serialize};
use sha2::Digest as _;

/// A hash function usable by the playgrounds.
pub trait Hasher {
    /// Human readable algorithm name.
    const NAME: &'static str;

    /// Hash `data` into a 32-byte digest.
    fn digest(data: &[u8]) -> [u8; 32];
}

/// SHA-256 (FIPS 180-4), as used by Bitcoin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sha256Hash;

impl Hasher for Sha256Hash {
    const NAME: &'static str = "sha256";

    fn digest(data: &[u8]) -> [u8; 32] {
        sha2::Sha256::digest(data).into()
    }
}

/// Legacy Keccak-256 (pre-standard SHA-3 padding), as used by Ethereum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keccak256Hash;

impl Hasher for Keccak256Hash {
    const NAME: &'static str = "keccak256";

    fn digest(data: &[u8]) -> [u8; 32] {
        sha3::Keccak256::digest(data).into()
    }
}

/// Blake3 in its default 32-byte output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blake3Hash;

impl Hasher for Blake3Hash {
    const NAME: &'static str = "blake3";

    fn digest(data: &[u8]) -> [u8; 32] {
        *blake3::hash(data).as_bytes()
    }
}

/// Runtime selection of a [`Hasher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Sha256,
    Keccak256,
    Blake3,
}

impl HashAlgorithm {
    pub const ALL: [HashAlgorithm; 3] = [Self::Sha256, Self::Keccak256, Self::Blake3];

    pub fn name(self) -> &'static str {
        match self {
            Self::Sha256 => Sha256Hash::NAME,
            Self::Keccak256 => Keccak256Hash::NAME,
            Self::Blake3 => Blake3Hash::NAME,
        }
    }

    pub fn digest(self, data: &[u8]) -> [u8; 32] {
        match self {
            Self::Sha256 => Sha256Hash::digest(data),
            Self::Keccak256 => Keccak256Hash::digest(data),
            Self::Blake3 => Blake3Hash::digest(data),
        }
    }

    /// Hash the UTF-8 bytes of `text` and render the digest as hex.
    pub fn digest_hex(self, text: &str) -> String {
        hex::encode(self.digest(text.as_bytes()))
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
