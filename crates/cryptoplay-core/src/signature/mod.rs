//! Signature schemes exposed to the playgrounds.
//!
//! Each scheme is a zero-sized type implementing [`SignatureScheme`]; the
//! curve arithmetic lives entirely in the backing crate (`k256`,
//! `ed25519-dalek`, `blst`). Keys and signatures cross this boundary as plain
//! byte strings so the front end only ever deals with hex.

mod bls;
mod ecdsa;
mod eddsa;
mod schnorr;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::PlaygroundError;

pub use bls::Bls;
pub use ecdsa::Ecdsa;
pub use eddsa::Eddsa;
pub use schnorr::Schnorr;

/// A freshly generated key pair.
///
/// The secret half is wiped from memory on drop.
#[derive(Clone)]
pub struct KeyPair {
    secret: Zeroizing<Vec<u8>>,
    public: Vec<u8>,
}

impl KeyPair {
    pub fn new(secret: Vec<u8>, public: Vec<u8>) -> Self {
        Self {
            secret: Zeroizing::new(secret),
            public,
        }
    }

    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    pub fn public(&self) -> &[u8] {
        &self.public
    }

    pub fn secret_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(&*self.secret))
    }

    pub fn public_hex(&self) -> String {
        hex::encode(&self.public)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("secret", &"<redacted>")
            .field("public", &self.public_hex())
            .finish()
    }
}

/// Key generation, signing and verification for one scheme.
pub trait SignatureScheme {
    /// Human readable scheme name.
    const NAME: &'static str;

    /// Generate a random key pair from the OS RNG.
    fn generate() -> Result<KeyPair, PlaygroundError>;

    /// Derive the public key for an encoded secret key.
    fn public_key(secret: &[u8]) -> Result<Vec<u8>, PlaygroundError>;

    /// Sign `message` with an encoded secret key.
    fn sign(secret: &[u8], message: &[u8]) -> Result<Vec<u8>, PlaygroundError>;

    /// Verify `signature` over `message`.
    ///
    /// A public key the library cannot decode is an error; a signature that
    /// cannot be decoded simply does not verify.
    fn verify(public: &[u8], message: &[u8], signature: &[u8]) -> Result<bool, PlaygroundError>;
}

/// Runtime selection of a [`SignatureScheme`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemeKind {
    Ecdsa,
    Schnorr,
    Eddsa,
    Bls,
}

impl SchemeKind {
    pub const ALL: [SchemeKind; 4] = [Self::Ecdsa, Self::Schnorr, Self::Eddsa, Self::Bls];

    pub fn name(self) -> &'static str {
        match self {
            Self::Ecdsa => Ecdsa::NAME,
            Self::Schnorr => Schnorr::NAME,
            Self::Eddsa => Eddsa::NAME,
            Self::Bls => Bls::NAME,
        }
    }

    pub fn generate(self) -> Result<KeyPair, PlaygroundError> {
        match self {
            Self::Ecdsa => Ecdsa::generate(),
            Self::Schnorr => Schnorr::generate(),
            Self::Eddsa => Eddsa::generate(),
            Self::Bls => Bls::generate(),
        }
    }

    pub fn public_key(self, secret: &[u8]) -> Result<Vec<u8>, PlaygroundError> {
        match self {
            Self::Ecdsa => Ecdsa::public_key(secret),
            Self::Schnorr => Schnorr::public_key(secret),
            Self::Eddsa => Eddsa::public_key(secret),
            Self::Bls => Bls::public_key(secret),
        }
    }

    pub fn sign(self, secret: &[u8], message: &[u8]) -> Result<Vec<u8>, PlaygroundError> {
        match self {
            Self::Ecdsa => Ecdsa::sign(secret, message),
            Self::Schnorr => Schnorr::sign(secret, message),
            Self::Eddsa => Eddsa::sign(secret, message),
            Self::Bls => Bls::sign(secret, message),
        }
    }

    pub fn verify(
        self,
        public: &[u8],
        message: &[u8],
        signature: &[u8],
    ) -> Result<bool, PlaygroundError> {
        match self {
            Self::Ecdsa => Ecdsa::verify(public, message, signature),
            Self::Schnorr => Schnorr::verify(public, message, signature),
            Self::Eddsa => Eddsa::verify(public, message, signature),
            Self::Bls => Bls::verify(public, message, signature),
        }
    }
}

impl fmt::Display for SchemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SchemeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ecdsa" | "secp256k1" => Ok(Self::Ecdsa),
            "schnorr" | "bip340" => Ok(Self::Schnorr),
            "eddsa" | "ed25519" | "frost" => Ok(Self::Eddsa),
            "bls" | "bls12-381" => Ok(Self::Bls),
            other => Err(format!("unknown signature scheme {other:?}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_scheme_round_trips() {
        for kind in SchemeKind::ALL {
            let pair = kind.generate().expect("keygen");
            assert_eq!(kind.public_key(pair.secret()).expect("derive"), pair.public());

            let sig = kind.sign(pair.secret(), b"Hello, blockchain!").expect("sign");
            assert!(kind.verify(pair.public(), b"Hello, blockchain!", &sig).unwrap(), "{kind}");
            assert!(!kind.verify(pair.public(), b"Hello, blockchain?", &sig).unwrap(), "{kind}");
        }
    }

    #[test]
    fn key_from_other_scheme_does_not_verify() {
        let message = b"cross";
        let signer = SchemeKind::Eddsa.generate().unwrap();
        let other = SchemeKind::Eddsa.generate().unwrap();
        let sig = SchemeKind::Eddsa.sign(signer.secret(), message).unwrap();
        assert!(!SchemeKind::Eddsa.verify(other.public(), message, &sig).unwrap());
    }

    #[test]
    fn parses_aliases() {
        assert_eq!("FROST".parse::<SchemeKind>(), Ok(SchemeKind::Eddsa));
        assert_eq!("secp256k1".parse::<SchemeKind>(), Ok(SchemeKind::Ecdsa));
        assert!("rsa".parse::<SchemeKind>().is_err());
    }

    #[test]
    fn debug_redacts_secret() {
        let pair = KeyPair::new(vec![0xaa; 32], vec![0x01]);
        let rendered = format!("{pair:?}");
        assert!(!rendered.contains("aaaa"));
        assert!(rendered.contains("redacted"));
    }
}
