//! Hash commitments, used to illustrate "prove you know the secret".
//!
//! Only a SHA-256 digest of the secret is kept. A guess is accepted when it
//! hashes to the same digest. This shows the flavour of a zero-knowledge
//! proof (the verifier never stores the secret) without being one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::encoding::decode_hex_array;
use crate::error::PlaygroundError;
use crate::hash::{Hasher, Sha256Hash};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretCommitment {
    #[serde(with = "crate::encoding::serde_digest")]
    digest: [u8; 32],
}

impl SecretCommitment {
    pub fn commit(secret: &str) -> Self {
        Self {
            digest: Sha256Hash::digest(secret.as_bytes()),
        }
    }

    /// True when `guess` hashes to the stored digest.
    pub fn prove(&self, guess: &str) -> bool {
        Sha256Hash::digest(guess.as_bytes()) == self.digest
    }
}

impl fmt::Display for SecretCommitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.digest))
    }
}

impl FromStr for SecretCommitment {
    type Err = PlaygroundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self {
            digest: decode_hex_array::<32>("commitment", s)?,
        })
    }
}
