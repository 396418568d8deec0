//! Toy key splitting for the MPC / TSS / FROST walkthroughs.
//!
//! This is **not** secret sharing. The hex encoding of a secret key is cut into
//! contiguous pieces; every piece is needed to sign, and each piece leaks its
//! part of the key. Real threshold schemes never reassemble the key.

use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

use crate::encoding::decode_hex;
use crate::error::PlaygroundError;
use crate::signature::SchemeKind;

/// Number of parties used by the walkthroughs.
pub const DEFAULT_PARTS: usize = 3;

/// Result of a simulated threshold signature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdSignature {
    pub scheme: SchemeKind,
    pub participants: usize,
    #[serde(with = "crate::encoding::serde_bytes")]
    pub public_key: Vec<u8>,
    #[serde(with = "crate::encoding::serde_bytes")]
    pub signature: Vec<u8>,
}

/// Cut `secret_hex` into `parts` chunks of `ceil(len / parts)` characters.
///
/// The last chunk may be shorter; it is never empty.
pub fn split_hex(secret_hex: &str, parts: usize) -> Result<Vec<String>, PlaygroundError> {
    let secret_hex = secret_hex.trim();
    let secret_hex = secret_hex
        .strip_prefix("0x")
        .or_else(|| secret_hex.strip_prefix("0X"))
        .unwrap_or(secret_hex);
    decode_hex("secret key", secret_hex)?;
    if parts == 0 {
        return Err(PlaygroundError::InvalidShares("need at least one share".into()));
    }
    let len = secret_hex.len();
    let chunk = len.div_ceil(parts);
    if chunk == 0 || chunk * (parts - 1) >= len {
        return Err(PlaygroundError::InvalidShares(format!(
            "cannot cut {len} hex characters into {parts} non-empty shares"
        )));
    }

    let shares: Vec<String> = secret_hex
        .as_bytes()
        .chunks(chunk)
        .map(|piece| String::from_utf8_lossy(piece).into_owned())
        .collect();
    debug!(parts = shares.len(), chunk, "split secret into shares");
    Ok(shares)
}

/// Concatenate shares back into the hex secret.
pub fn join_shares<S: AsRef<str>>(shares: &[S]) -> Result<Zeroizing<String>, PlaygroundError> {
    if shares.is_empty() {
        return Err(PlaygroundError::InvalidShares("no shares supplied".into()));
    }
    let mut joined = Zeroizing::new(String::new());
    for share in shares {
        let share = share.as_ref().trim();
        if share.is_empty() {
            return Err(PlaygroundError::InvalidShares("empty share".into()));
        }
        joined.push_str(share);
    }
    decode_hex("joined shares", &joined)?;
    Ok(joined)
}

/// "Sign together": rebuild the key from every share and sign once.
pub fn threshold_sign<S: AsRef<str>>(
    scheme: SchemeKind,
    shares: &[S],
    message: &[u8],
) -> Result<ThresholdSignature, PlaygroundError> {
    let joined = join_shares(shares)?;
    let secret = Zeroizing::new(decode_hex("joined shares", &joined)?);
    let public_key = scheme.public_key(&secret)?;
    let signature = scheme.sign(&secret, message)?;
    debug!(%scheme, participants = shares.len(), "simulated threshold signature");
    Ok(ThresholdSignature {
        scheme,
        participants: shares.len(),
        public_key,
        signature,
    })
}
