use crate::core::{hash_transaction, Transaction};
use data_encoding::HEXLOWER;
use std::collections::HashMap;
use std::sync::RwLock;

/// Deduplicated pending-transaction set, keyed by tx hash.
///
/// ( K -> txid hex, V -> Transaction )
///
/// `add` returning false on a duplicate is what breaks gossip broadcast
/// loops: a node only re-broadcasts transactions it has not seen before.
pub struct Mempool {
    inner: RwLock<HashMap<String, Transaction>>,
}

impl Default for Mempool {
    fn default() -> Self {
        Self::new()
    }
}

impl Mempool {
    pub fn new() -> Mempool {
        Mempool {
            inner: RwLock::new(HashMap::new()),
        }
    }

    pub fn has(&self, tx: &Transaction) -> bool {
        let txid = match hash_transaction(tx) {
            Ok(hash) => HEXLOWER.encode(&hash),
            Err(e) => {
                log::error!("failed to hash transaction: {e}");
                return false;
            }
        };
        match self.inner.read() {
            Ok(pool) => pool.contains_key(&txid),
            Err(_) => {
                log::error!("failed to acquire read lock on mempool");
                false
            }
        }
    }

    /// Insert a transaction; returns false if it was already pending.
    pub fn add(&self, tx: &Transaction) -> bool {
        let txid = match hash_transaction(tx) {
            Ok(hash) => HEXLOWER.encode(&hash),
            Err(e) => {
                log::error!("failed to hash transaction: {e}");
                return false;
            }
        };
        match self.inner.write() {
            Ok(mut pool) => {
                if pool.contains_key(&txid) {
                    return false;
                }
                pool.insert(txid, tx.clone());
                true
            }
            Err(_) => {
                log::error!("failed to acquire write lock on mempool");
                false
            }
        }
    }

    pub fn remove(&self, txid: &str) {
        match self.inner.write() {
            Ok(mut pool) => {
                pool.remove(txid);
            }
            Err(_) => {
                log::error!("failed to acquire write lock on mempool");
            }
        }
    }

    /// Snapshot and clear in one step: the validator's drain.
    pub fn take_all(&self) -> Vec<Transaction> {
        match self.inner.write() {
            Ok(mut pool) => std::mem::take(&mut *pool).into_values().collect(),
            Err(_) => {
                log::error!("failed to acquire write lock on mempool");
                Vec::new()
            }
        }
    }

    pub fn len(&self) -> usize {
        match self.inner.read() {
            Ok(pool) => pool.len(),
            Err(_) => {
                log::error!("failed to acquire read lock on mempool");
                0
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        match self.inner.read() {
            Ok(pool) => pool.is_empty(),
            Err(_) => {
                log::error!("failed to acquire read lock on mempool");
                true
            }
        }
    }
}
