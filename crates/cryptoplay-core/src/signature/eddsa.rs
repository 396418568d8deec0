use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use tracing::debug;

use super::{KeyPair, SignatureScheme};
use crate::error::PlaygroundError;

/// Ed25519 (RFC 8032), the curve FROST signs on in the threshold demo.
#[derive(Debug, Clone, Copy)]
pub struct Eddsa;

fn signing_key(secret: &[u8]) -> Result<SigningKey, PlaygroundError> {
    let bytes: [u8; 32] = secret.try_into().map_err(|_| PlaygroundError::InvalidKey {
        scheme: Eddsa::NAME,
        kind: "secret",
    })?;
    Ok(SigningKey::from_bytes(&bytes))
}

impl SignatureScheme for Eddsa {
    const NAME: &'static str = "ed25519";

    fn generate() -> Result<KeyPair, PlaygroundError> {
        let key = SigningKey::generate(&mut OsRng);
        debug!(scheme = Self::NAME, "generated key pair");
        Ok(KeyPair::new(
            key.to_bytes().to_vec(),
            key.verifying_key().as_bytes().to_vec(),
        ))
    }

    fn public_key(secret: &[u8]) -> Result<Vec<u8>, PlaygroundError> {
        Ok(signing_key(secret)?.verifying_key().as_bytes().to_vec())
    }

    fn sign(secret: &[u8], message: &[u8]) -> Result<Vec<u8>, PlaygroundError> {
        let key = signing_key(secret)?;
        Ok(key.sign(message).to_bytes().to_vec())
    }

    fn verify(public: &[u8], message: &[u8], signature: &[u8]) -> Result<bool, PlaygroundError> {
        let invalid = || PlaygroundError::InvalidKey {
            scheme: Self::NAME,
            kind: "public",
        };
        let bytes: [u8; 32] = public.try_into().map_err(|_| invalid())?;
        let key = VerifyingKey::from_bytes(&bytes).map_err(|_| invalid())?;
        let Ok(signature) = Signature::from_slice(signature) else {
            return Ok(false);
        };
        Ok(key.verify(message, &signature).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 8032 section 7.1, TEST 1 (empty message).
    const RFC_SECRET: &str = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";
    const RFC_PUBLIC: &str = "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a";

    #[test]
    fn derives_rfc8032_public_key() {
        let secret = hex::decode(RFC_SECRET).unwrap();
        assert_eq!(hex::encode(Eddsa::public_key(&secret).unwrap()), RFC_PUBLIC);
    }

    #[test]
    fn verifies_own_signature() {
        let secret = hex::decode(RFC_SECRET).unwrap();
        let public = hex::decode(RFC_PUBLIC).unwrap();
        let sig = Eddsa::sign(&secret, b"Hello from FROST!").unwrap();
        assert!(Eddsa::verify(&public, b"Hello from FROST!", &sig).unwrap());
        assert!(!Eddsa::verify(&public, b"", &sig).unwrap());
    }

    #[test]
    fn malformed_signature_does_not_verify() {
        let public = hex::decode(RFC_PUBLIC).unwrap();
        assert!(!Eddsa::verify(&public, b"m", &[0u8; 63]).unwrap());
        assert!(!Eddsa::verify(&public, b"m", &[0xffu8; 64]).unwrap());
        assert!(!Eddsa::verify(&public, b"m", &[]).unwrap());
    }

    #[test]
    fn wrong_length_public_key() {
        assert!(matches!(
            Eddsa::verify(&[1u8; 31], b"m", &[0u8; 64]),
            Err(PlaygroundError::InvalidKey { kind: "public", .. })
        ));
    }
}
