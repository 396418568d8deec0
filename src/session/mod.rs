//! In-memory state of the interactive playgrounds.
//!
//! Each session mirrors one page: the user edits some inputs, presses a
//! button, and the derived values are recomputed. Actions whose prerequisites
//! are missing (signing before a key exists, adding before encrypting) are
//! silent no-ops, reported back as `false` / `None`.

use std::collections::HashMap;

use anyhow::{bail, Context, Result};
use cryptoplay_core::merkle::{HexSha256, MerkleProof, MerkleTree};
use cryptoplay_core::paillier::{self, PaillierPrivateKey, PaillierPublicKey};
use cryptoplay_core::signature::{KeyPair, SchemeKind};
use num_bigint::BigUint;
use tracing::debug;

/// Leaves the Merkle page starts with.
pub const SAMPLE_TRANSACTIONS: [&str; 4] = [
    "Alice pays Bob 1 BTC",
    "Bob pays Carol 0.5 BTC",
    "Carol pays Dave 0.2 BTC",
    "Dave pays Eve 0.1 BTC",
];

/// Removing is disabled once this few leaves remain.
pub const MIN_LEAVES: usize = 2;

//==================== Merkle ====================//

pub struct MerkleSession {
    leaves: Vec<String>,
    selected: usize,
    tree: MerkleTree<HexSha256>,
}

impl MerkleSession {
    pub fn new() -> Result<Self> {
        Self::with_leaves(SAMPLE_TRANSACTIONS.iter().map(|s| s.to_string()).collect())
    }

    pub fn with_leaves(leaves: Vec<String>) -> Result<Self> {
        let tree = MerkleTree::build(&leaves).context("building merkle tree")?;
        Ok(Self {
            leaves,
            selected: 0,
            tree,
        })
    }

    fn rebuild(&mut self) -> Result<()> {
        self.tree = MerkleTree::build(&self.leaves).context("rebuilding merkle tree")?;
        if self.selected >= self.leaves.len() {
            self.selected = self.leaves.len() - 1;
        }
        debug!(leaves = self.tree.leaf_count(), root = %self.tree.root_hex(), "merkle session rebuilt");
        Ok(())
    }

    pub fn leaves(&self) -> &[String] {
        &self.leaves
    }

    /// Append a leaf; blank input is ignored.
    pub fn add(&mut self, leaf: &str) -> Result<bool> {
        let leaf = leaf.trim();
        if leaf.is_empty() {
            return Ok(false);
        }
        self.leaves.push(leaf.to_string());
        self.rebuild()?;
        Ok(true)
    }

    pub fn edit(&mut self, index: usize, value: &str) -> Result<()> {
        let Some(slot) = self.leaves.get_mut(index) else {
            bail!("no leaf at index {index} ({} leaves)", self.leaves.len());
        };
        *slot = value.to_string();
        self.rebuild()
    }

    /// Remove a leaf unless that would leave fewer than [`MIN_LEAVES`].
    pub fn remove(&mut self, index: usize) -> Result<bool> {
        if self.leaves.len() <= MIN_LEAVES || index >= self.leaves.len() {
            return Ok(false);
        }
        self.leaves.remove(index);
        self.rebuild()?;
        Ok(true)
    }

    pub fn select(&mut self, index: usize) -> Result<()> {
        if index >= self.leaves.len() {
            bail!("no leaf at index {index} ({} leaves)", self.leaves.len());
        }
        self.selected = index;
        Ok(())
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn root_hex(&self) -> String {
        self.tree.root_hex()
    }

    pub fn proof(&self) -> Result<MerkleProof> {
        Ok(self.tree.proof(self.selected)?)
    }

    /// Whether the selected leaf verifies against the current root.
    pub fn proof_valid(&self) -> Result<bool> {
        let proof = self.proof()?;
        Ok(self.tree.verify(self.leaves[self.selected].as_bytes(), &proof))
    }
}

//==================== Signatures ====================//

/// Message a signing page is pre-filled with.
pub fn default_message(scheme: SchemeKind) -> &'static str {
    match scheme {
        SchemeKind::Ecdsa => "Hello, blockchain!",
        SchemeKind::Schnorr => "Schnorr is cool!",
        SchemeKind::Eddsa => "Hello from FROST!",
        SchemeKind::Bls => "I ❤️ BLS",
    }
}

pub struct SignerSession {
    scheme: SchemeKind,
    keys: Option<KeyPair>,
    message: String,
    signature: Option<Vec<u8>>,
    verdict: Option<bool>,
}

impl SignerSession {
    pub fn new(scheme: SchemeKind) -> Self {
        Self {
            scheme,
            keys: None,
            message: default_message(scheme).to_string(),
            signature: None,
            verdict: None,
        }
    }

    pub fn scheme(&self) -> SchemeKind {
        self.scheme
    }

    pub fn keys(&self) -> Option<&KeyPair> {
        self.keys.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn signature(&self) -> Option<&[u8]> {
        self.signature.as_deref()
    }

    pub fn verdict(&self) -> Option<bool> {
        self.verdict
    }

    /// Fresh key pair; any previous signature and verdict are dropped.
    pub fn generate(&mut self) -> Result<()> {
        self.keys = Some(self.scheme.generate()?);
        self.signature = None;
        self.verdict = None;
        Ok(())
    }

    pub fn set_message(&mut self, message: &str) {
        self.message = message.to_string();
    }

    /// Sign the current message. No-op without a key.
    pub fn sign(&mut self) -> Result<bool> {
        let Some(keys) = &self.keys else {
            return Ok(false);
        };
        self.signature = Some(self.scheme.sign(keys.secret(), self.message.as_bytes())?);
        self.verdict = None;
        Ok(true)
    }

    /// Verify the stored signature against the current message.
    /// No-op without a key or a signature.
    pub fn verify(&mut self) -> Result<Option<bool>> {
        let (Some(keys), Some(signature)) = (&self.keys, &self.signature) else {
            return Ok(None);
        };
        let valid = self
            .scheme
            .verify(keys.public(), self.message.as_bytes(), signature)?;
        self.verdict = Some(valid);
        Ok(self.verdict)
    }
}

/// One signer per scheme, created on first use.
#[derive(Default)]
pub struct SignerSessions {
    sessions: HashMap<SchemeKind, SignerSession>,
}

impl SignerSessions {
    pub fn get(&mut self, scheme: SchemeKind) -> &mut SignerSession {
        self.sessions
            .entry(scheme)
            .or_insert_with(|| SignerSession::new(scheme))
    }
}

//==================== Paillier ====================//

pub struct PaillierSession {
    bits: usize,
    keys: Option<(PaillierPublicKey, PaillierPrivateKey)>,
    plaintexts: (String, String),
    ciphertexts: Option<(BigUint, BigUint)>,
    sum: Option<BigUint>,
    decrypted: Option<BigUint>,
}

impl PaillierSession {
    pub fn new(bits: usize) -> Self {
        Self {
            bits,
            keys: None,
            plaintexts: ("5".to_string(), "7".to_string()),
            ciphertexts: None,
            sum: None,
            decrypted: None,
        }
    }

    pub fn has_keys(&self) -> bool {
        self.keys.is_some()
    }

    pub fn plaintexts(&self) -> (&str, &str) {
        (&self.plaintexts.0, &self.plaintexts.1)
    }

    pub fn ciphertexts(&self) -> Option<&(BigUint, BigUint)> {
        self.ciphertexts.as_ref()
    }

    pub fn sum(&self) -> Option<&BigUint> {
        self.sum.as_ref()
    }

    pub fn decrypted(&self) -> Option<&BigUint> {
        self.decrypted.as_ref()
    }

    pub fn generate(&mut self) -> Result<()> {
        self.keys = Some(paillier::generate_keypair(self.bits)?);
        self.ciphertexts = None;
        self.sum = None;
        self.decrypted = None;
        Ok(())
    }

    pub fn set_plaintexts(&mut self, a: &str, b: &str) {
        self.plaintexts = (a.trim().to_string(), b.trim().to_string());
    }

    /// Encrypt both plaintexts. No-op without keys.
    pub fn encrypt(&mut self) -> Result<bool> {
        let Some((public, _)) = &self.keys else {
            return Ok(false);
        };
        let a = paillier::parse_biguint("first plaintext", &self.plaintexts.0)?;
        let b = paillier::parse_biguint("second plaintext", &self.plaintexts.1)?;
        self.ciphertexts = Some((public.encrypt(&a)?, public.encrypt(&b)?));
        self.sum = None;
        self.decrypted = None;
        Ok(true)
    }

    /// Multiply the ciphertexts and decrypt the product.
    /// No-op without keys or ciphertexts.
    pub fn add_and_decrypt(&mut self) -> Result<Option<BigUint>> {
        let (Some((public, private)), Some((c1, c2))) = (&self.keys, &self.ciphertexts) else {
            return Ok(None);
        };
        let sum = public.add(c1, c2)?;
        let decrypted = private.decrypt(&sum)?;
        self.sum = Some(sum);
        self.decrypted = Some(decrypted.clone());
        Ok(Some(decrypted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merkle_session_starts_with_sample_transactions() {
        let session = MerkleSession::new().unwrap();
        assert_eq!(session.leaves().len(), 4);
        assert_eq!(session.selected(), 0);
        assert!(session.proof_valid().unwrap());
    }

    #[test]
    fn adding_trims_and_ignores_blank() {
        let mut session = MerkleSession::new().unwrap();
        let before = session.root_hex();
        assert!(!session.add("   ").unwrap());
        assert_eq!(session.root_hex(), before);
        assert!(session.add("  Eve pays Frank 3 BTC ").unwrap());
        assert_eq!(session.leaves().last().unwrap(), "Eve pays Frank 3 BTC");
        assert_ne!(session.root_hex(), before);
    }

    #[test]
    fn remove_refused_at_two_leaves() {
        let mut session = MerkleSession::with_leaves(vec!["a".into(), "b".into(), "c".into()]).unwrap();
        session.select(2).unwrap();
        assert!(session.remove(0).unwrap());
        assert_eq!(session.leaves(), ["b", "c"]);
        // selection is clamped to the shorter list
        assert_eq!(session.selected(), 1);
        assert!(!session.remove(0).unwrap());
        assert_eq!(session.leaves().len(), 2);
    }

    #[test]
    fn edit_changes_root_and_keeps_proofs_valid() {
        let mut session = MerkleSession::new().unwrap();
        let before = session.root_hex();
        session.edit(2, "Carol pays Dave 20 BTC").unwrap();
        assert_ne!(session.root_hex(), before);
        session.select(2).unwrap();
        assert!(session.proof_valid().unwrap());
        assert!(session.edit(9, "x").is_err());
        assert!(session.select(9).is_err());
    }

    #[test]
    fn signer_noops_without_prerequisites() {
        let mut session = SignerSession::new(SchemeKind::Ecdsa);
        assert_eq!(session.message(), "Hello, blockchain!");
        assert!(!session.sign().unwrap());
        assert_eq!(session.verify().unwrap(), None);

        session.generate().unwrap();
        assert_eq!(session.verify().unwrap(), None);
        assert!(session.sign().unwrap());
        assert_eq!(session.verify().unwrap(), Some(true));

        session.set_message("Hello, blockchain?");
        assert_eq!(session.verify().unwrap(), Some(false));

        session.sign().unwrap();
        assert_eq!(session.verdict(), None);
    }

    #[test]
    fn regenerating_clears_signature() {
        let mut session = SignerSession::new(SchemeKind::Schnorr);
        session.generate().unwrap();
        session.sign().unwrap();
        assert!(session.signature().is_some());
        session.generate().unwrap();
        assert!(session.signature().is_none());
        assert_eq!(session.verdict(), None);
    }

    #[test]
    fn signer_sessions_are_per_scheme() {
        let mut sessions = SignerSessions::default();
        sessions.get(SchemeKind::Eddsa).set_message("custom");
        assert_eq!(sessions.get(SchemeKind::Eddsa).message(), "custom");
        assert_eq!(sessions.get(SchemeKind::Bls).message(), "I ❤️ BLS");
    }

    #[test]
    fn paillier_session_flow() {
        let mut session = PaillierSession::new(256);
        assert!(!session.encrypt().unwrap());
        assert_eq!(session.add_and_decrypt().unwrap(), None);

        session.generate().unwrap();
        assert_eq!(session.add_and_decrypt().unwrap(), None);
        assert!(session.encrypt().unwrap());
        assert_eq!(session.add_and_decrypt().unwrap(), Some(BigUint::from(12u32)));

        session.set_plaintexts("40", " 2 ");
        session.encrypt().unwrap();
        assert_eq!(session.sum(), None);
        assert_eq!(session.add_and_decrypt().unwrap(), Some(BigUint::from(42u32)));
    }

    #[test]
    fn paillier_rejects_bad_plaintext() {
        let mut session = PaillierSession::new(256);
        session.generate().unwrap();
        session.set_plaintexts("five", "7");
        assert!(session.encrypt().is_err());
    }
}
