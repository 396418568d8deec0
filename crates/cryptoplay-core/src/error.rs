use thiserror::Error;

/// Canonical error type exposed by the playground primitives.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlaygroundError {
    /// A Merkle tree needs at least one leaf.
    #[error("merkle tree requires at least one leaf")]
    EmptyTree,

    /// Proof requested for a leaf that is not in the tree.
    #[error("leaf index {index} out of range for {leaves} leaves")]
    LeafIndexOutOfRange { index: usize, leaves: usize },

    /// Input that should have been hex was not.
    #[error("invalid hex in {field}: {reason}")]
    InvalidHex { field: &'static str, reason: String },

    /// Input that should have been a non-negative integer was not.
    #[error("invalid {field}: {value:?} is not a non-negative integer")]
    InvalidNumber { field: &'static str, value: String },

    /// Decoded bytes have the wrong size for the target type.
    #[error("{field} must be {expected} bytes, got {actual}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Key material rejected by the underlying signature library.
    #[error("invalid {scheme} {kind} key")]
    InvalidKey {
        scheme: &'static str,
        kind: &'static str,
    },

    /// A textual proof step could not be parsed.
    #[error("invalid proof step {0:?}: expected left:<hex> or right:<hex>")]
    InvalidProofStep(String),

    /// Signing failed inside the signature library.
    #[error("{scheme} signing failed: {reason}")]
    Signing {
        scheme: &'static str,
        reason: String,
    },

    /// Key generation failed inside the underlying library.
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    /// Paillier plaintext is not below the modulus.
    #[error("plaintext must be smaller than the paillier modulus")]
    PlaintextOutOfRange,

    /// Paillier ciphertext is not below the squared modulus.
    #[error("ciphertext must be smaller than the squared paillier modulus")]
    CiphertextOutOfRange,

    /// Unsupported Paillier modulus size.
    #[error("paillier modulus must be an even number of bits >= 128, got {0}")]
    InvalidModulusSize(usize),

    /// A supplied Paillier modulus is even or not greater than one.
    #[error("invalid paillier modulus {0}: must be odd and greater than one")]
    InvalidModulus(String),

    /// Share splitting/joining parameters do not fit the secret.
    #[error("invalid shares: {0}")]
    InvalidShares(String),

    /// Timing runs need at least one iteration.
    #[error("iterations must be greater than zero")]
    InvalidIterations,
}
