//! Core primitives for the cryptoplay playgrounds.
//!
//! Every playground calls exactly one primitive from an external crate and
//! shows the result as hex. The modules here are the thin layer between the
//! front end and those crates:
//!
//! * [`merkle`]: binary Merkle tree construction, inclusion proofs and
//!   verification, generic over a [`merkle::MerkleHasher`].
//! * [`hash`]: SHA-256, Keccak-256 and Blake3 digests behind [`hash::Hasher`].
//! * [`signature`]: ECDSA, Schnorr (BIP-340), Ed25519 and BLS12-381 behind
//!   [`signature::SignatureScheme`].
//! * [`paillier`]: additively homomorphic Paillier encryption.
//! * [`shares`]: the (deliberately insecure) key splitting used to illustrate
//!   threshold signing.
//! * [`commitment`]: hash commitments used to illustrate proving knowledge
//!   of a secret.
//! * [`speed`]: sign/verify timing for the scheme comparison table.
//!
//! Curve operations, hashes and big integer arithmetic come from their
//! respective crates.

pub mod commitment;
pub mod encoding;
pub mod hash;
pub mod merkle;
pub mod paillier;
pub mod shares;
pub mod signature;
pub mod speed;

mod error;

pub use error::PlaygroundError;

/// Convenience alias used throughout the crate.
pub type Result<T, E = PlaygroundError> = std::result::Result<T, E>;
