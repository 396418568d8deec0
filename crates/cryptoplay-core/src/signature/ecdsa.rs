use k256::ecdsa::signature::{Signer, Verifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use tracing::debug;

use super::{KeyPair, SignatureScheme};
use crate::error::PlaygroundError;

/// ECDSA over secp256k1 with RFC 6979 nonces.
///
/// Messages are hashed with SHA-256 before signing, matching how Bitcoin
/// style wallets sign. Public keys are 33-byte compressed SEC1 points and
/// signatures are 64-byte compact `r || s` (low-S normalised).
#[derive(Debug, Clone, Copy)]
pub struct Ecdsa;

fn signing_key(secret: &[u8]) -> Result<SigningKey, PlaygroundError> {
    SigningKey::from_slice(secret).map_err(|_| PlaygroundError::InvalidKey {
        scheme: Ecdsa::NAME,
        kind: "secret",
    })
}

fn encode_public(key: &VerifyingKey) -> Vec<u8> {
    key.to_encoded_point(true).as_bytes().to_vec()
}

impl SignatureScheme for Ecdsa {
    const NAME: &'static str = "ecdsa-secp256k1";

    fn generate() -> Result<KeyPair, PlaygroundError> {
        let key = SigningKey::random(&mut OsRng);
        let public = encode_public(key.verifying_key());
        debug!(scheme = Self::NAME, "generated key pair");
        Ok(KeyPair::new(key.to_bytes().to_vec(), public))
    }

    fn public_key(secret: &[u8]) -> Result<Vec<u8>, PlaygroundError> {
        Ok(encode_public(signing_key(secret)?.verifying_key()))
    }

    fn sign(secret: &[u8], message: &[u8]) -> Result<Vec<u8>, PlaygroundError> {
        let key = signing_key(secret)?;
        let signature: Signature = key
            .try_sign(message)
            .map_err(|err| PlaygroundError::Signing {
                scheme: Self::NAME,
                reason: err.to_string(),
            })?;
        Ok(signature.to_bytes().to_vec())
    }

    fn verify(public: &[u8], message: &[u8], signature: &[u8]) -> Result<bool, PlaygroundError> {
        let key = VerifyingKey::from_sec1_bytes(public).map_err(|_| PlaygroundError::InvalidKey {
            scheme: Self::NAME,
            kind: "public",
        })?;
        let Ok(signature) = Signature::from_slice(signature) else {
            return Ok(false);
        };
        Ok(key.verify(message, &signature).is_ok())
    }
}
