// Transactions move value between addresses in the UTXO model: each input
// consumes a previous output, each output locks an amount to an address.
// Ownership is implicit via the address; there is no script layer.

use crate::crypto::{PrivateKey, PublicKey, Signature};
use crate::error::Result;
use crate::utils::{deserialize, serialize, sha256_digest};
use serde::{Deserialize, Serialize};

/// A reference to a previous output, plus the key and signature that
/// authorize spending it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct TxInput {
    /// Hash of the transaction containing the output being spent
    pub prev_tx_hash: Vec<u8>,
    /// Index of that output within its transaction
    pub prev_out_index: u32,
    /// Public key of the output's owner
    pub public_key: Vec<u8>,
    /// Signature over the transaction pre-image, attached after signing
    pub signature: Vec<u8>,
}

/// An amount locked to a 20-byte address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct TxOutput {
    pub amount: i64,
    pub address: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct Transaction {
    pub version: u32,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
}

impl Transaction {
    /// A coinbase transaction mints value without consuming outputs. Only
    /// the genesis block carries one.
    pub fn is_coinbase(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        serialize(self)
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Transaction> {
        deserialize(bytes)
    }
}

/// SHA-256 over the deterministic encoding of the transaction as given.
///
/// The hash of a fully signed transaction is its identity: the mempool key,
/// the tx-store key, and the `prev_tx_hash` later inputs point at.
pub fn hash_transaction(tx: &Transaction) -> Result<Vec<u8>> {
    Ok(sha256_digest(&tx.serialize()?))
}

// The signing pre-image is the transaction with EVERY input signature blank.
// Inputs are signed independently, so if the pre-image included earlier
// signatures it would depend on signing order; blanking them all gives
// signer and verifier the same bytes no matter when each input was signed.
fn unsigned_copy(tx: &Transaction) -> Transaction {
    let mut copy = tx.clone();
    for input in &mut copy.inputs {
        input.signature = vec![];
    }
    copy
}

/// Sign the transaction pre-image. The caller attaches the returned
/// signature to each input it owns.
pub fn sign_transaction(private_key: &PrivateKey, tx: &Transaction) -> Result<Signature> {
    let pre_image = hash_transaction(&unsigned_copy(tx))?;
    Ok(private_key.sign(&pre_image))
}

/// Verify every input signature against the shared pre-image.
///
/// A missing or malformed signature or key fails verification; malformed
/// input never panics. Coinbase transactions have no inputs to check.
pub fn verify_transaction(tx: &Transaction) -> bool {
    let pre_image = match hash_transaction(&unsigned_copy(tx)) {
        Ok(hash) => hash,
        Err(_) => return false,
    };

    for input in &tx.inputs {
        let signature = match Signature::from_bytes(&input.signature) {
            Ok(signature) => signature,
            Err(_) => return false,
        };
        let public_key = match PublicKey::from_bytes(&input.public_key) {
            Ok(public_key) => public_key,
            Err(_) => return false,
        };
        if !signature.verify(&public_key, &pre_image) {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::random_hash;

    #[test]
    fn test_sign_and_verify_transaction() {
        let from = PrivateKey::generate().unwrap();
        let to = PrivateKey::generate().unwrap();

        let mut tx = Transaction {
            version: 1,
            inputs: vec![TxInput {
                prev_tx_hash: random_hash(),
                prev_out_index: 0,
                public_key: from.public().to_vec(),
                signature: vec![],
            }],
            outputs: vec![
                TxOutput {
                    amount: 5,
                    address: to.public().address().to_vec(),
                },
                TxOutput {
                    amount: 95,
                    address: from.public().address().to_vec(),
                },
            ],
        };

        let signature = sign_transaction(&from, &tx).unwrap();
        tx.inputs[0].signature = signature.to_vec();

        assert!(verify_transaction(&tx));
    }

    #[test]
    fn test_missing_signature_fails() {
        let from = PrivateKey::generate().unwrap();
        let tx = Transaction {
            version: 1,
            inputs: vec![TxInput {
                prev_tx_hash: random_hash(),
                prev_out_index: 0,
                public_key: from.public().to_vec(),
                signature: vec![],
            }],
            outputs: vec![],
        };
        assert!(!verify_transaction(&tx));
    }

    #[test]
    fn test_tampered_output_fails() {
        let from = PrivateKey::generate().unwrap();
        let to = PrivateKey::generate().unwrap();

        let mut tx = Transaction {
            version: 1,
            inputs: vec![TxInput {
                prev_tx_hash: random_hash(),
                prev_out_index: 0,
                public_key: from.public().to_vec(),
                signature: vec![],
            }],
            outputs: vec![TxOutput {
                amount: 5,
                address: to.public().address().to_vec(),
            }],
        };

        let signature = sign_transaction(&from, &tx).unwrap();
        tx.inputs[0].signature = signature.to_vec();
        tx.outputs[0].amount = 500;

        assert!(!verify_transaction(&tx));
    }

    #[test]
    fn test_inputs_signed_independently_share_one_pre_image() {
        let alice = PrivateKey::generate().unwrap();
        let bob = PrivateKey::generate().unwrap();

        let mut tx = Transaction {
            version: 1,
            inputs: vec![
                TxInput {
                    prev_tx_hash: random_hash(),
                    prev_out_index: 0,
                    public_key: alice.public().to_vec(),
                    signature: vec![],
                },
                TxInput {
                    prev_tx_hash: random_hash(),
                    prev_out_index: 1,
                    public_key: bob.public().to_vec(),
                    signature: vec![],
                },
            ],
            outputs: vec![TxOutput {
                amount: 10,
                address: alice.public().address().to_vec(),
            }],
        };

        // Alice attaches her signature first; Bob signs the transaction
        // afterwards, with her signature already present.
        let alice_sig = sign_transaction(&alice, &tx).unwrap();
        tx.inputs[0].signature = alice_sig.to_vec();

        let bob_sig = sign_transaction(&bob, &tx).unwrap();
        tx.inputs[1].signature = bob_sig.to_vec();

        assert!(verify_transaction(&tx));
    }

    #[test]
    fn test_hash_is_deterministic() {
        let from = PrivateKey::generate().unwrap();
        let to = PrivateKey::generate().unwrap();
        let tx = crate::utils::random_transaction(&from, &to);

        let first = hash_transaction(&tx).unwrap();
        let second = hash_transaction(&tx).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 32);
    }

    #[test]
    fn test_coinbase_has_no_inputs() {
        let tx = Transaction {
            version: 1,
            inputs: vec![],
            outputs: vec![],
        };
        assert!(tx.is_coinbase());
        assert!(verify_transaction(&tx));
    }
}
