use crate::core::transaction::{hash_transaction, Transaction};
use crate::error::{NodeError, Result};
use crate::utils::sha256_digest;

/// Merkle tree over transaction hashes.
///
/// Leaves are `hash_transaction` outputs in block order. Levels with an odd
/// node count duplicate the last node; a single leaf pairs with itself.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    root: Vec<u8>,
    leaf_count: usize,
}

impl MerkleTree {
    /// Build a tree from pre-computed leaf hashes.
    pub fn from_hashes(hashes: &[Vec<u8>]) -> Result<MerkleTree> {
        if hashes.is_empty() {
            return Err(NodeError::Verification(
                "cannot build a Merkle tree from an empty hash list".to_string(),
            ));
        }

        let mut level: Vec<Vec<u8>> = hashes.to_vec();
        loop {
            let mut parents = Vec::with_capacity((level.len() + 1) / 2);
            let mut i = 0;
            while i < level.len() {
                let left = &level[i];
                let right = if i + 1 < level.len() {
                    &level[i + 1]
                } else {
                    left
                };
                parents.push(hash_pair(left, right));
                i += 2;
            }

            if parents.len() == 1 {
                return Ok(MerkleTree {
                    root: parents.remove(0),
                    leaf_count: hashes.len(),
                });
            }
            level = parents;
        }
    }

    /// Build a tree over a block's transactions, in array order.
    pub fn from_transactions(transactions: &[Transaction]) -> Result<MerkleTree> {
        let mut leaves = Vec::with_capacity(transactions.len());
        for tx in transactions {
            leaves.push(hash_transaction(tx)?);
        }
        Self::from_hashes(&leaves)
    }

    pub fn root_hash(&self) -> &[u8] {
        &self.root
    }

    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }
}

/// The Merkle root committing to `transactions` in array order.
pub fn merkle_root(transactions: &[Transaction]) -> Result<Vec<u8>> {
    Ok(MerkleTree::from_transactions(transactions)?.root_hash().to_vec())
}

fn hash_pair(left: &[u8], right: &[u8]) -> Vec<u8> {
    let mut combined = Vec::with_capacity(left.len() + right.len());
    combined.extend_from_slice(left);
    combined.extend_from_slice(right);
    sha256_digest(&combined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::random_hash;

    #[test]
    fn test_empty_hash_list_rejected() {
        assert!(MerkleTree::from_hashes(&[]).is_err());
    }

    #[test]
    fn test_single_leaf_pairs_with_itself() {
        let leaf = random_hash();
        let tree = MerkleTree::from_hashes(&[leaf.clone()]).unwrap();
        assert_eq!(tree.root_hash(), hash_pair(&leaf, &leaf).as_slice());
    }

    #[test]
    fn test_two_leaves() {
        let (a, b) = (random_hash(), random_hash());
        let tree = MerkleTree::from_hashes(&[a.clone(), b.clone()]).unwrap();
        assert_eq!(tree.root_hash(), hash_pair(&a, &b).as_slice());
    }

    #[test]
    fn test_odd_level_duplicates_last() {
        let (a, b, c) = (random_hash(), random_hash(), random_hash());
        let tree = MerkleTree::from_hashes(&[a.clone(), b.clone(), c.clone()]).unwrap();

        let left = hash_pair(&a, &b);
        let right = hash_pair(&c, &c);
        assert_eq!(tree.root_hash(), hash_pair(&left, &right).as_slice());
    }

    #[test]
    fn test_any_leaf_change_moves_the_root() {
        let leaves: Vec<Vec<u8>> = (0..4).map(|_| random_hash()).collect();
        let root = MerkleTree::from_hashes(&leaves).unwrap().root_hash().to_vec();

        for i in 0..leaves.len() {
            let mut tampered = leaves.clone();
            tampered[i] = random_hash();
            let other = MerkleTree::from_hashes(&tampered).unwrap();
            assert_ne!(root, other.root_hash());
        }
    }

    #[test]
    fn test_root_is_deterministic() {
        let leaves: Vec<Vec<u8>> = (0..7).map(|_| random_hash()).collect();
        let a = MerkleTree::from_hashes(&leaves).unwrap();
        let b = MerkleTree::from_hashes(&leaves).unwrap();
        assert_eq!(a.root_hash(), b.root_hash());
        assert_eq!(a.leaf_count(), 7);
    }
}
