use blst::min_pk::{PublicKey, SecretKey, Signature};
use blst::BLST_ERROR;
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::debug;
use zeroize::Zeroizing;

use super::{KeyPair, SignatureScheme};
use crate::error::PlaygroundError;

/// Proof-of-possession ciphersuite for signatures in G2.
const DST: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_POP_";

/// BLS signatures on BLS12-381: 48-byte public keys in G1, 96-byte
/// signatures in G2.
#[derive(Debug, Clone, Copy)]
pub struct Bls;

fn secret_key(secret: &[u8]) -> Result<SecretKey, PlaygroundError> {
    SecretKey::from_bytes(secret).map_err(|_| PlaygroundError::InvalidKey {
        scheme: Bls::NAME,
        kind: "secret",
    })
}

impl SignatureScheme for Bls {
    const NAME: &'static str = "bls12-381";

    fn generate() -> Result<KeyPair, PlaygroundError> {
        let mut ikm = Zeroizing::new([0u8; 32]);
        OsRng.fill_bytes(&mut *ikm);
        let key = SecretKey::key_gen(&*ikm, &[])
            .map_err(|err| PlaygroundError::KeyGeneration(format!("blst: {err:?}")))?;
        debug!(scheme = Self::NAME, "generated key pair");
        Ok(KeyPair::new(
            key.to_bytes().to_vec(),
            key.sk_to_pk().compress().to_vec(),
        ))
    }

    fn public_key(secret: &[u8]) -> Result<Vec<u8>, PlaygroundError> {
        Ok(secret_key(secret)?.sk_to_pk().compress().to_vec())
    }

    fn sign(secret: &[u8], message: &[u8]) -> Result<Vec<u8>, PlaygroundError> {
        let key = secret_key(secret)?;
        Ok(key.sign(message, DST, &[]).compress().to_vec())
    }

    fn verify(public: &[u8], message: &[u8], signature: &[u8]) -> Result<bool, PlaygroundError> {
        let key = PublicKey::from_bytes(public).map_err(|_| PlaygroundError::InvalidKey {
            scheme: Self::NAME,
            kind: "public",
        })?;
        let Ok(signature) = Signature::from_bytes(signature) else {
            return Ok(false);
        };
        let outcome = signature.verify(true, message, DST, &[], &key, true);
        Ok(outcome == BLST_ERROR::BLST_SUCCESS)
    }
}
