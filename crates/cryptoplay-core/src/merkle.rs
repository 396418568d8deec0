//! Binary Merkle trees with positional inclusion proofs.
//!
//! Leaves are hashed, adjacent hashes are paired and hashed to form the next
//! level, and an unpaired trailing hash is carried up unchanged (never
//! duplicated). How leaves and node pairs are hashed is delegated to a
//! [`MerkleHasher`], so the same tree code serves both the hex-concatenating
//! SHA-256 layout and the sorted-pair Keccak layout.

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PlaygroundError;
use crate::hash::{Hasher, Keccak256Hash, Sha256Hash};

/// A node value in the tree.
pub type Digest = [u8; 32];

/// Leaf and node hashing policy for a tree.
pub trait MerkleHasher {
    /// Human readable scheme name.
    const NAME: &'static str;

    /// Hash a raw leaf.
    fn hash_leaf(data: &[u8]) -> Digest;

    /// Hash an ordered pair of children into their parent.
    fn hash_nodes(left: &Digest, right: &Digest) -> Digest;
}

/// SHA-256 leaves; parents hash the concatenated hex text of both children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexSha256;

impl MerkleHasher for HexSha256 {
    const NAME: &'static str = "hex-sha256";

    fn hash_leaf(data: &[u8]) -> Digest {
        Sha256Hash::digest(data)
    }

    fn hash_nodes(left: &Digest, right: &Digest) -> Digest {
        let mut text = String::with_capacity(128);
        text.push_str(&hex::encode(left));
        text.push_str(&hex::encode(right));
        Sha256Hash::digest(text.as_bytes())
    }
}

/// Keccak-256 leaves; parents hash the raw children with the smaller first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortedKeccak256;

impl MerkleHasher for SortedKeccak256 {
    const NAME: &'static str = "sorted-keccak256";

    fn hash_leaf(data: &[u8]) -> Digest {
        Keccak256Hash::digest(data)
    }

    fn hash_nodes(left: &Digest, right: &Digest) -> Digest {
        let (first, second) = if left <= right {
            (left, right)
        } else {
            (right, left)
        };
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(first);
        buf[32..].copy_from_slice(second);
        Keccak256Hash::digest(&buf)
    }
}

/// Side on which a sibling is concatenated when recomputing the parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Left,
    Right,
}

impl Position {
    pub fn as_str(self) -> &'static str {
        match self {
            Position::Left => "left",
            Position::Right => "right",
        }
    }
}

/// One level of an inclusion proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofStep {
    #[serde(with = "crate::encoding::serde_digest")]
    pub sibling: Digest,
    pub position: Position,
}

impl fmt::Display for ProofStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.position.as_str(), hex::encode(self.sibling))
    }
}

impl FromStr for ProofStep {
    type Err = PlaygroundError;

    /// Parses `left:<hex>` or `right:<hex>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (side, digest) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| PlaygroundError::InvalidProofStep(s.to_string()))?;
        let position = match side.trim().to_ascii_lowercase().as_str() {
            "left" | "l" => Position::Left,
            "right" | "r" => Position::Right,
            _ => return Err(PlaygroundError::InvalidProofStep(s.to_string())),
        };
        let sibling = crate::encoding::decode_hex_array::<32>("proof sibling", digest)?;
        Ok(ProofStep { sibling, position })
    }
}

/// Inclusion proof for a single leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    pub leaf_index: usize,
    pub steps: Vec<ProofStep>,
}

impl MerkleProof {
    pub fn steps(&self) -> &[ProofStep] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }
}

/// Build every level of the tree, bottom (hashed leaves) to top (root).
pub fn build_levels<H, I, L>(leaves: I) -> Result<Vec<Vec<Digest>>, PlaygroundError>
where
    H: MerkleHasher,
    I: IntoIterator<Item = L>,
    L: AsRef<[u8]>,
{
    let hashed: Vec<Digest> = leaves
        .into_iter()
        .map(|leaf| H::hash_leaf(leaf.as_ref()))
        .collect();
    build_levels_from_hashes::<H>(hashed)
}

/// Same as [`build_levels`] for leaves that are already hashed.
pub fn build_levels_from_hashes<H: MerkleHasher>(
    leaf_hashes: Vec<Digest>,
) -> Result<Vec<Vec<Digest>>, PlaygroundError> {
    if leaf_hashes.is_empty() {
        return Err(PlaygroundError::EmptyTree);
    }

    let mut levels = Vec::new();
    let mut current = leaf_hashes;
    while current.len() > 1 {
        let next: Vec<Digest> = current
            .chunks(2)
            .map(|pair| match pair {
                [left, right] => H::hash_nodes(left, right),
                // odd tail is promoted as-is
                [single] => *single,
                _ => unreachable!("chunks(2) yields one or two items"),
            })
            .collect();
        levels.push(std::mem::replace(&mut current, next));
    }
    levels.push(current);
    Ok(levels)
}

/// Collect the sibling path for `index` from the given levels.
///
/// Levels where the node had no sibling (it was carried up) contribute no step.
pub fn generate_proof(levels: &[Vec<Digest>], index: usize) -> Result<MerkleProof, PlaygroundError> {
    let leaves = levels.first().map(Vec::len).unwrap_or(0);
    if index >= leaves {
        return Err(PlaygroundError::LeafIndexOutOfRange { index, leaves });
    }

    let mut steps = Vec::with_capacity(levels.len().saturating_sub(1));
    let mut idx = index;
    for level in &levels[..levels.len() - 1] {
        let sibling_idx = idx ^ 1;
        if let Some(sibling) = level.get(sibling_idx) {
            let position = if idx % 2 == 1 {
                Position::Left
            } else {
                Position::Right
            };
            steps.push(ProofStep {
                sibling: *sibling,
                position,
            });
        }
        idx /= 2;
    }

    Ok(MerkleProof {
        leaf_index: index,
        steps,
    })
}

/// Recompute the root from a raw leaf and its proof and compare.
pub fn verify_proof<H: MerkleHasher>(leaf: &[u8], proof: &[ProofStep], root: &Digest) -> bool {
    let computed = proof
        .iter()
        .fold(H::hash_leaf(leaf), |running, step| match step.position {
            Position::Left => H::hash_nodes(&step.sibling, &running),
            Position::Right => H::hash_nodes(&running, &step.sibling),
        });
    &computed == root
}

/// In-memory Merkle tree, rebuilt from scratch whenever the leaves change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleTree<H = HexSha256> {
    levels: Vec<Vec<Digest>>,
    _hasher: PhantomData<H>,
}

impl<H: MerkleHasher> MerkleTree<H> {
    /// Hash the given leaves and build the tree.
    pub fn build<I, L>(leaves: I) -> Result<Self, PlaygroundError>
    where
        I: IntoIterator<Item = L>,
        L: AsRef<[u8]>,
    {
        let levels = build_levels::<H, _, _>(leaves)?;
        debug!(
            scheme = H::NAME,
            leaves = levels[0].len(),
            height = levels.len(),
            "built merkle tree"
        );
        Ok(Self {
            levels,
            _hasher: PhantomData,
        })
    }

    /// All levels, bottom to top.
    pub fn levels(&self) -> &[Vec<Digest>] {
        &self.levels
    }

    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    /// Number of levels including the leaves and the root.
    pub fn height(&self) -> usize {
        self.levels.len()
    }

    pub fn root(&self) -> Digest {
        self.levels[self.levels.len() - 1][0]
    }

    pub fn root_hex(&self) -> String {
        hex::encode(self.root())
    }

    /// Inclusion proof for the leaf at `index`.
    pub fn proof(&self, index: usize) -> Result<MerkleProof, PlaygroundError> {
        let proof = generate_proof(&self.levels, index)?;
        debug!(scheme = H::NAME, index, steps = proof.len(), "generated merkle proof");
        Ok(proof)
    }

    /// Check `leaf` against this tree's root.
    pub fn verify(&self, leaf: &[u8], proof: &MerkleProof) -> bool {
        verify_proof::<H>(leaf, &proof.steps, &self.root())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(data: &str) -> Digest {
        HexSha256::hash_leaf(data.as_bytes())
    }

    fn node(left: &Digest, right: &Digest) -> Digest {
        HexSha256::hash_nodes(left, right)
    }

    #[test]
    fn three_leaves_carry_the_odd_node() {
        let tree = MerkleTree::<HexSha256>::build(["a", "b", "c"]).expect("tree");
        let (ha, hb, hc) = (h("a"), h("b"), h("c"));

        assert_eq!(tree.levels()[0], vec![ha, hb, hc]);
        assert_eq!(tree.levels()[1], vec![node(&ha, &hb), hc]);
        assert_eq!(tree.root(), node(&node(&ha, &hb), &hc));

        let proof = tree.proof(0).expect("proof");
        assert_eq!(
            proof.steps,
            vec![
                ProofStep { sibling: hb, position: Position::Right },
                ProofStep { sibling: hc, position: Position::Right },
            ]
        );
        assert!(tree.verify(b"a", &proof));

        // "c" was promoted at level 0, so its path only has the level-1 sibling.
        let proof_c = tree.proof(2).expect("proof");
        assert_eq!(
            proof_c.steps,
            vec![ProofStep { sibling: node(&ha, &hb), position: Position::Left }]
        );
        assert!(tree.verify(b"c", &proof_c));
    }

    #[test]
    fn two_leaves() {
        let tree = MerkleTree::<HexSha256>::build(["x", "y"]).expect("tree");
        let (hx, hy) = (h("x"), h("y"));
        assert_eq!(tree.root(), node(&hx, &hy));
        assert_eq!(
            tree.proof(0).unwrap().steps,
            vec![ProofStep { sibling: hy, position: Position::Right }]
        );
        assert_eq!(
            tree.proof(1).unwrap().steps,
            vec![ProofStep { sibling: hx, position: Position::Left }]
        );
    }

    #[test]
    fn parent_hashes_hex_text_of_children() {
        let (hx, hy) = (h("x"), h("y"));
        let text = format!("{}{}", hex::encode(hx), hex::encode(hy));
        assert_eq!(node(&hx, &hy), Sha256Hash::digest(text.as_bytes()));
    }

    #[test]
    fn single_leaf_root_is_leaf_hash() {
        let tree = MerkleTree::<HexSha256>::build(["solo"]).expect("tree");
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.root(), h("solo"));
        let proof = tree.proof(0).expect("proof");
        assert!(proof.is_empty());
        assert!(tree.verify(b"solo", &proof));
        assert!(!tree.verify(b"other", &proof));
    }

    #[test]
    fn empty_input_is_rejected() {
        let leaves: Vec<&str> = Vec::new();
        assert_eq!(
            MerkleTree::<HexSha256>::build(leaves).unwrap_err(),
            PlaygroundError::EmptyTree
        );
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let tree = MerkleTree::<HexSha256>::build(["a", "b"]).expect("tree");
        assert_eq!(
            tree.proof(2).unwrap_err(),
            PlaygroundError::LeafIndexOutOfRange { index: 2, leaves: 2 }
        );
    }

    #[test]
    fn proof_fails_for_other_leaf_at_same_index() {
        let txs = [
            "Alice pays Bob 1 BTC",
            "Bob pays Carol 0.5 BTC",
            "Carol pays Dave 0.2 BTC",
            "Dave pays Eve 0.1 BTC",
        ];
        let tree = MerkleTree::<HexSha256>::build(txs).expect("tree");
        let proof = tree.proof(1).expect("proof");
        assert!(tree.verify(txs[1].as_bytes(), &proof));
        assert!(!tree.verify(b"Bob pays Carol 50 BTC", &proof));
        // right leaf, wrong index
        let proof_other = tree.proof(2).expect("proof");
        assert!(!tree.verify(txs[1].as_bytes(), &proof_other));
    }

    #[test]
    fn sorted_keccak_ignores_positions() {
        let tree = MerkleTree::<SortedKeccak256>::build(["a", "b", "c"]).expect("tree");
        let mut proof = tree.proof(1).expect("proof");
        assert!(tree.verify(b"b", &proof));
        for step in &mut proof.steps {
            step.position = match step.position {
                Position::Left => Position::Right,
                Position::Right => Position::Left,
            };
        }
        assert!(tree.verify(b"b", &proof));
    }

    #[test]
    fn sorted_keccak_matches_sort_pairs_tree() {
        // merkletreejs, keccak256 leaves, { sortPairs: true }
        let tree = MerkleTree::<SortedKeccak256>::build(["a", "b", "c"]).expect("tree");
        assert_eq!(
            hex::encode(tree.levels()[1][0]),
            "805b21d846b189efaeb0377d6bb0d201b3872a363e607c25088f025b0c6ae1f8"
        );
        assert_eq!(
            tree.root_hex(),
            "5842148bc6ebeb52af882a317c765fccd3ae80589b21a9b8cbf21abb630e46a7"
        );
    }

    #[test]
    fn hex_sha256_is_order_sensitive() {
        let tree = MerkleTree::<HexSha256>::build(["a", "b"]).expect("tree");
        let mut proof = tree.proof(0).expect("proof");
        proof.steps[0].position = Position::Left;
        assert!(!tree.verify(b"a", &proof));
    }

    #[test]
    fn proof_step_text_round_trip() {
        let step = ProofStep {
            sibling: h("b"),
            position: Position::Right,
        };
        let text = step.to_string();
        assert!(text.starts_with("right:"));
        assert_eq!(text.parse::<ProofStep>().unwrap(), step);
        assert!(matches!(
            "up:00".parse::<ProofStep>(),
            Err(PlaygroundError::InvalidProofStep(_))
        ));
        assert!(matches!(
            "left".parse::<ProofStep>(),
            Err(PlaygroundError::InvalidProofStep(_))
        ));
    }

    #[test]
    fn proof_serializes_sibling_as_hex() {
        let tree = MerkleTree::<HexSha256>::build(["x", "y"]).expect("tree");
        let proof = tree.proof(0).expect("proof");
        let json = serde_json::to_value(&proof).expect("json");
        assert_eq!(json["steps"][0]["position"], "right");
        assert_eq!(json["steps"][0]["sibling"], hex::encode(h("y")));
        let back: MerkleProof = serde_json::from_value(json).expect("parse");
        assert_eq!(back, proof);
    }
}
