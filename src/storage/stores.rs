use crate::core::{hash_block, hash_transaction, Block, Transaction};
use crate::error::{NodeError, Result};
use data_encoding::HEXLOWER;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

/// An unspent transaction output as tracked by the ledger.
///
/// Created unspent when its block is accepted; flipped to spent exactly
/// once when an input consumes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct Utxo {
    /// Hex hash of the transaction that created this output
    pub tx_hash: String,
    /// Index of the output within that transaction
    pub out_index: u32,
    pub amount: i64,
    pub spent: bool,
}

impl Utxo {
    pub fn key(&self) -> String {
        utxo_key(&self.tx_hash, self.out_index)
    }
}

/// The external UTXO key: `"{tx_hash_hex}_{out_index}"`.
pub fn utxo_key(tx_hash_hex: &str, out_index: u32) -> String {
    format!("{tx_hash_hex}_{out_index}")
}

pub trait BlockStore: Send + Sync {
    fn put(&self, block: &Block) -> Result<()>;
    fn get(&self, hash_hex: &str) -> Result<Block>;
}

pub trait TxStore: Send + Sync {
    fn put(&self, tx: &Transaction) -> Result<()>;
    fn get(&self, hash_hex: &str) -> Result<Transaction>;
}

pub trait UtxoStore: Send + Sync {
    fn put(&self, utxo: &Utxo) -> Result<()>;
    fn get(&self, key: &str) -> Result<Utxo>;
}

/// ( K -> block hash hex, V -> Block )
#[derive(Default)]
pub struct MemoryBlockStore {
    inner: RwLock<HashMap<String, Block>>,
}

impl MemoryBlockStore {
    pub fn new() -> MemoryBlockStore {
        MemoryBlockStore {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl BlockStore for MemoryBlockStore {
    fn put(&self, block: &Block) -> Result<()> {
        let hash_hex = HEXLOWER.encode(&hash_block(block)?);
        let mut blocks = self
            .inner
            .write()
            .expect("block store lock poisoned - this should never happen");
        blocks.insert(hash_hex, block.clone());
        Ok(())
    }

    fn get(&self, hash_hex: &str) -> Result<Block> {
        let blocks = self
            .inner
            .read()
            .expect("block store lock poisoned - this should never happen");
        blocks
            .get(hash_hex)
            .cloned()
            .ok_or_else(|| NodeError::NotFound(format!("block {hash_hex}")))
    }
}

/// ( K -> txid hex, V -> Transaction )
#[derive(Default)]
pub struct MemoryTxStore {
    inner: RwLock<HashMap<String, Transaction>>,
}

impl MemoryTxStore {
    pub fn new() -> MemoryTxStore {
        MemoryTxStore {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl TxStore for MemoryTxStore {
    fn put(&self, tx: &Transaction) -> Result<()> {
        let hash_hex = HEXLOWER.encode(&hash_transaction(tx)?);
        let mut txs = self
            .inner
            .write()
            .expect("tx store lock poisoned - this should never happen");
        txs.insert(hash_hex, tx.clone());
        Ok(())
    }

    fn get(&self, hash_hex: &str) -> Result<Transaction> {
        let txs = self
            .inner
            .read()
            .expect("tx store lock poisoned - this should never happen");
        txs.get(hash_hex)
            .cloned()
            .ok_or_else(|| NodeError::NotFound(format!("transaction {hash_hex}")))
    }
}

/// ( K -> "{tx_hash_hex}_{out_index}", V -> Utxo )
#[derive(Default)]
pub struct MemoryUtxoStore {
    inner: RwLock<HashMap<String, Utxo>>,
}

impl MemoryUtxoStore {
    pub fn new() -> MemoryUtxoStore {
        MemoryUtxoStore {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl UtxoStore for MemoryUtxoStore {
    fn put(&self, utxo: &Utxo) -> Result<()> {
        let mut utxos = self
            .inner
            .write()
            .expect("utxo store lock poisoned - this should never happen");
        utxos.insert(utxo.key(), utxo.clone());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Utxo> {
        let utxos = self
            .inner
            .read()
            .expect("utxo store lock poisoned - this should never happen");
        utxos
            .get(key)
            .cloned()
            .ok_or_else(|| NodeError::NotFound(format!("utxo {key}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::PrivateKey;
    use crate::utils::{random_block, random_transaction};

    #[test]
    fn test_block_store_roundtrip() {
        let store = MemoryBlockStore::new();
        let block = random_block();
        store.put(&block).unwrap();

        let hash_hex = HEXLOWER.encode(&hash_block(&block).unwrap());
        assert_eq!(store.get(&hash_hex).unwrap(), block);
    }

    #[test]
    fn test_block_store_missing_key() {
        let store = MemoryBlockStore::new();
        assert!(matches!(
            store.get("deadbeef"),
            Err(NodeError::NotFound(_))
        ));
    }

    #[test]
    fn test_tx_store_roundtrip() {
        let store = MemoryTxStore::new();
        let from = PrivateKey::generate().unwrap();
        let to = PrivateKey::generate().unwrap();
        let tx = random_transaction(&from, &to);
        store.put(&tx).unwrap();

        let hash_hex = HEXLOWER.encode(&hash_transaction(&tx).unwrap());
        assert_eq!(store.get(&hash_hex).unwrap(), tx);
    }

    #[test]
    fn test_utxo_store_key_format() {
        let store = MemoryUtxoStore::new();
        let utxo = Utxo {
            tx_hash: "ab".repeat(32),
            out_index: 3,
            amount: 42,
            spent: false,
        };
        store.put(&utxo).unwrap();

        let key = format!("{}_{}", "ab".repeat(32), 3);
        assert_eq!(utxo.key(), key);
        assert_eq!(store.get(&key).unwrap(), utxo);
        assert!(store.get(&utxo_key(&"ab".repeat(32), 4)).is_err());
    }

    #[test]
    fn test_utxo_overwrite_marks_spent() {
        let store = MemoryUtxoStore::new();
        let mut utxo = Utxo {
            tx_hash: "cd".repeat(32),
            out_index: 0,
            amount: 1000,
            spent: false,
        };
        store.put(&utxo).unwrap();

        utxo.spent = true;
        store.put(&utxo).unwrap();
        assert!(store.get(&utxo.key()).unwrap().spent);
    }
}
