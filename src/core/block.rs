use crate::core::merkle::merkle_root;
use crate::core::transaction::Transaction;
use crate::crypto::{PrivateKey, PublicKey, Signature, PUB_KEY_LEN, SIGNATURE_LEN};
use crate::error::Result;
use crate::utils::{deserialize, serialize, sha256_digest};
use serde::{Deserialize, Serialize};

/// The block header: everything the block signature commits to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct Header {
    pub version: u32,
    pub height: i32,
    /// Hash of the previous block's header; 32 zero bytes for genesis
    pub prev_hash: Vec<u8>,
    /// Merkle root over the block's transactions; empty when there are none
    pub root_hash: Vec<u8>,
    /// Nanoseconds since the Unix epoch
    pub timestamp: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct Block {
    pub header: Header,
    /// Public key of the validator that signed this block
    pub public_key: Vec<u8>,
    /// Signature over the header hash
    pub signature: Vec<u8>,
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn serialize(&self) -> Result<Vec<u8>> {
        serialize(self)
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Block> {
        deserialize(bytes)
    }
}

/// SHA-256 over the deterministic encoding of a header.
pub fn hash_header(header: &Header) -> Result<Vec<u8>> {
    Ok(sha256_digest(&serialize(header)?))
}

/// A block's hash is its header's hash. The transaction list is committed
/// to through `header.root_hash`, not hashed directly.
pub fn hash_block(block: &Block) -> Result<Vec<u8>> {
    hash_header(&block.header)
}

/// Sign a block:
/// 1. with transactions present, compute and assign the Merkle root;
/// 2. hash the header;
/// 3. stamp the signature and the signer's public key onto the block.
pub fn sign_block(private_key: &PrivateKey, block: &mut Block) -> Result<Signature> {
    if !block.transactions.is_empty() {
        block.header.root_hash = merkle_root(&block.transactions)?;
    }
    let hash = hash_block(block)?;
    let signature = private_key.sign(&hash);
    block.signature = signature.to_vec();
    block.public_key = private_key.public().to_vec();
    Ok(signature)
}

/// Check that the recorded Merkle root matches the transactions.
pub fn verify_merkle(block: &Block) -> bool {
    match merkle_root(&block.transactions) {
        Ok(root) => root == block.header.root_hash,
        Err(_) => false,
    }
}

/// Verify a block's authenticity. The verdict is the boolean: malformed
/// keys, signatures or roots make it false, never a panic.
pub fn verify_block(block: &Block) -> bool {
    if !block.transactions.is_empty() && !verify_merkle(block) {
        return false;
    }
    if block.public_key.len() != PUB_KEY_LEN {
        return false;
    }
    if block.signature.len() != SIGNATURE_LEN {
        return false;
    }

    let signature = match Signature::from_bytes(&block.signature) {
        Ok(signature) => signature,
        Err(_) => return false,
    };
    let public_key = match PublicKey::from_bytes(&block.public_key) {
        Ok(public_key) => public_key,
        Err(_) => return false,
    };
    let hash = match hash_block(block) {
        Ok(hash) => hash,
        Err(_) => return false,
    };
    signature.verify(&public_key, &hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transaction::sign_transaction;
    use crate::utils::{random_block, random_hash, random_transaction};

    #[test]
    fn test_hash_block_is_32_bytes() {
        let block = random_block();
        assert_eq!(hash_block(&block).unwrap().len(), 32);
    }

    #[test]
    fn test_hash_block_is_deterministic() {
        let block = random_block();
        assert_eq!(hash_block(&block).unwrap(), hash_block(&block).unwrap());
    }

    #[test]
    fn test_sign_and_verify_block() {
        let mut block = random_block();
        let private_key = PrivateKey::generate().unwrap();

        let signature = sign_block(&private_key, &mut block).unwrap();
        assert_eq!(signature.as_bytes().len(), SIGNATURE_LEN);
        assert!(signature.verify(&private_key.public(), &hash_block(&block).unwrap()));
        assert!(verify_block(&block));
    }

    #[test]
    fn test_foreign_public_key_fails() {
        let mut block = random_block();
        let private_key = PrivateKey::generate().unwrap();
        sign_block(&private_key, &mut block).unwrap();

        let other = PrivateKey::generate().unwrap();
        block.public_key = other.public().to_vec();
        assert!(!verify_block(&block));
    }

    #[test]
    fn test_signature_covers_header_through_merkle_root() {
        let from = PrivateKey::generate().unwrap();
        let to = PrivateKey::generate().unwrap();
        let validator = PrivateKey::generate().unwrap();

        let mut tx = random_transaction(&from, &to);
        let sig = sign_transaction(&from, &tx).unwrap();
        tx.inputs[0].signature = sig.to_vec();

        let mut block = random_block();
        block.transactions.push(tx);
        sign_block(&validator, &mut block).unwrap();
        assert!(verify_block(&block));

        // Swapping the transaction list without re-rooting trips the Merkle
        // check; touching the root itself trips the header signature.
        let mut tampered_txs = block.clone();
        let mut extra = random_transaction(&from, &to);
        let extra_sig = sign_transaction(&from, &extra).unwrap();
        extra.inputs[0].signature = extra_sig.to_vec();
        tampered_txs.transactions.push(extra);
        assert!(!verify_block(&tampered_txs));

        let mut tampered_root = block.clone();
        tampered_root.header.root_hash = random_hash();
        assert!(!verify_block(&tampered_root));
    }

    #[test]
    fn test_malformed_key_and_signature_lengths() {
        let mut block = random_block();
        let private_key = PrivateKey::generate().unwrap();
        sign_block(&private_key, &mut block).unwrap();

        let mut short_key = block.clone();
        short_key.public_key = vec![1, 2, 3];
        assert!(!verify_block(&short_key));

        let mut short_sig = block.clone();
        short_sig.signature = vec![1, 2, 3];
        assert!(!verify_block(&short_sig));
    }

    #[test]
    fn test_empty_transaction_list_is_valid() {
        let mut block = random_block();
        block.transactions.clear();
        let private_key = PrivateKey::generate().unwrap();
        sign_block(&private_key, &mut block).unwrap();
        assert!(verify_block(&block));
    }
}
