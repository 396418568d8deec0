use k256::schnorr::signature::{Signer, Verifier};
use k256::schnorr::{Signature, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use tracing::debug;

use super::{KeyPair, SignatureScheme};
use crate::error::PlaygroundError;

/// BIP-340 Schnorr signatures over secp256k1 (x-only 32-byte public keys).
#[derive(Debug, Clone, Copy)]
pub struct Schnorr;

fn signing_key(secret: &[u8]) -> Result<SigningKey, PlaygroundError> {
    SigningKey::from_bytes(secret).map_err(|_| PlaygroundError::InvalidKey {
        scheme: Schnorr::NAME,
        kind: "secret",
    })
}

impl SignatureScheme for Schnorr {
    const NAME: &'static str = "schnorr-bip340";

    fn generate() -> Result<KeyPair, PlaygroundError> {
        let key = SigningKey::random(&mut OsRng);
        let public = key.verifying_key().to_bytes().to_vec();
        debug!(scheme = Self::NAME, "generated key pair");
        Ok(KeyPair::new(key.to_bytes().to_vec(), public))
    }

    fn public_key(secret: &[u8]) -> Result<Vec<u8>, PlaygroundError> {
        Ok(signing_key(secret)?.verifying_key().to_bytes().to_vec())
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
        let key = VerifyingKey::from_bytes(public).map_err(|_| PlaygroundError::InvalidKey {
            scheme: Self::NAME,
            kind: "public",
        })?;
        let Ok(signature) = Signature::try_from(signature) else {
            return Ok(false);
        };
        Ok(key.verify(message, &signature).is_ok())
    }
}
