// The chain is the ledger state machine: an append-only header list plus
// the block, transaction and UTXO stores it projects accepted blocks into.
// There is one linear chain and one assumed validator role; fork choice and
// reorganization are deliberately absent.

use crate::core::block::{hash_block, hash_header, sign_block, verify_block, Block, Header};
use crate::core::transaction::{hash_transaction, verify_transaction, Transaction, TxOutput};
use crate::crypto::PrivateKey;
use crate::error::{NodeError, Result};
use crate::storage::{
    utxo_key, BlockStore, MemoryBlockStore, MemoryTxStore, MemoryUtxoStore, TxStore, Utxo,
    UtxoStore,
};
use data_encoding::HEXLOWER;
use log::info;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::sync::{Mutex, RwLock};

/// Fixed seed behind the genesis block; every node derives the identical
/// genesis from it, so fresh nodes agree on the chain root without syncing.
pub const GENESIS_SEED: &str = "33c3e6749d95d5e9611c3f8e6ebcfe10d840226c46c4df18b7026b64be73a13f";

/// Amount minted to the genesis address by the genesis coinbase.
pub const GENESIS_AMOUNT: i64 = 1000;

static GENESIS_PRIVATE_KEY: Lazy<PrivateKey> = Lazy::new(|| {
    PrivateKey::from_hex(GENESIS_SEED).expect("genesis seed is a fixed valid 32-byte hex string")
});

/// The well-known genesis keypair. Demos and tests use it to spend the
/// genesis output.
pub fn genesis_private_key() -> &'static PrivateKey {
    &GENESIS_PRIVATE_KEY
}

/// Append-only list of accepted block headers, oldest first.
#[derive(Debug, Default)]
pub struct HeaderList {
    headers: Vec<Header>,
}

impl HeaderList {
    pub fn new() -> HeaderList {
        HeaderList {
            headers: Vec::new(),
        }
    }

    pub fn add(&mut self, header: Header) {
        self.headers.push(header);
    }

    pub fn get(&self, index: usize) -> Option<&Header> {
        self.headers.get(index)
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Height of the tip; genesis sits at height 0.
    pub fn height(&self) -> i32 {
        self.headers.len() as i32 - 1
    }
}

pub struct Chain {
    headers: RwLock<HeaderList>,
    block_store: Box<dyn BlockStore>,
    tx_store: Box<dyn TxStore>,
    utxo_store: Box<dyn UtxoStore>,
    // Serializes add_block: validation must see the tip it appends onto.
    append_lock: Mutex<()>,
}

impl Chain {
    /// Build a chain over the given stores and bootstrap the genesis block
    /// through the internal, unvalidated append path.
    pub fn new(
        block_store: Box<dyn BlockStore>,
        tx_store: Box<dyn TxStore>,
        utxo_store: Box<dyn UtxoStore>,
    ) -> Result<Chain> {
        let chain = Chain {
            headers: RwLock::new(HeaderList::new()),
            block_store,
            tx_store,
            utxo_store,
            append_lock: Mutex::new(()),
        };
        let genesis = create_genesis_block()?;
        chain.apply_block(&genesis)?;
        info!(
            "chain bootstrapped, genesis pays {} to {}",
            GENESIS_AMOUNT,
            genesis_private_key().public().address()
        );
        Ok(chain)
    }

    /// A chain over the in-memory reference stores.
    pub fn in_memory() -> Result<Chain> {
        Self::new(
            Box::new(MemoryBlockStore::new()),
            Box::new(MemoryTxStore::new()),
            Box::new(MemoryUtxoStore::new()),
        )
    }

    pub fn height(&self) -> i32 {
        self.headers
            .read()
            .expect("header list lock poisoned - this should never happen")
            .height()
    }

    /// Validate and append a block. Appends are serialized by the chain
    /// lock so validation always runs against the tip it extends.
    pub fn add_block(&self, block: &Block) -> Result<()> {
        let _guard = self
            .append_lock
            .lock()
            .expect("chain append lock poisoned - this should never happen");
        self.validate_block(block)?;
        self.apply_block(block)
    }

    // The unvalidated append: project the block into the stores, then
    // publish its header. Any storage error out of here leaves the node's
    // local state compromised; callers treat it as fatal.
    fn apply_block(&self, block: &Block) -> Result<()> {
        for tx in &block.transactions {
            self.tx_store.put(tx)?;
            let tx_hash_hex = HEXLOWER.encode(&hash_transaction(tx)?);

            // every output becomes a fresh unspent UTXO
            for (index, output) in tx.outputs.iter().enumerate() {
                self.utxo_store.put(&Utxo {
                    tx_hash: tx_hash_hex.clone(),
                    out_index: index as u32,
                    amount: output.amount,
                    spent: false,
                })?;
            }

            // every input marks its referenced UTXO as consumed
            for input in &tx.inputs {
                let key = utxo_key(&HEXLOWER.encode(&input.prev_tx_hash), input.prev_out_index);
                let mut utxo = self.utxo_store.get(&key)?;
                utxo.spent = true;
                self.utxo_store.put(&utxo)?;
            }
        }

        self.block_store.put(block)?;
        self.headers
            .write()
            .expect("header list lock poisoned - this should never happen")
            .add(block.header.clone());
        Ok(())
    }

    pub fn get_block_by_hash(&self, hash: &[u8]) -> Result<Block> {
        self.block_store.get(&HEXLOWER.encode(hash))
    }

    pub fn get_block_by_height(&self, height: i32) -> Result<Block> {
        let tip = self.height();
        if height < 0 || height > tip {
            return Err(NodeError::HeightOutOfRange {
                requested: height,
                tip,
            });
        }
        let header = self
            .headers
            .read()
            .expect("header list lock poisoned - this should never happen")
            .get(height as usize)
            .cloned()
            .ok_or_else(|| NodeError::NotFound(format!("header at height {height}")))?;
        let hash = hash_header(&header)?;
        self.get_block_by_hash(&hash)
    }

    /// The most recently accepted block.
    pub fn tip(&self) -> Result<Block> {
        self.get_block_by_height(self.height())
    }

    /// Look up a UTXO by its `"{tx_hash_hex}_{out_index}"` key.
    pub fn get_utxo(&self, key: &str) -> Result<Utxo> {
        self.utxo_store.get(key)
    }

    /// Decide whether a block may extend the chain:
    /// 1. its signature and Merkle root hold up;
    /// 2. its prev-hash links to the current tip;
    /// 3. every transaction validates against the UTXO set;
    /// 4. no two transactions in it consume the same output.
    pub fn validate_block(&self, block: &Block) -> Result<()> {
        if !verify_block(block) {
            return Err(NodeError::Verification(
                "invalid block signature or merkle root".to_string(),
            ));
        }

        let tip = self.tip()?;
        let tip_hash = hash_block(&tip)?;
        if tip_hash != block.header.prev_hash {
            return Err(NodeError::Verification(format!(
                "previous hash mismatch at height {}: expected {}, got {}",
                block.header.height,
                HEXLOWER.encode(&tip_hash),
                HEXLOWER.encode(&block.header.prev_hash),
            )));
        }

        for tx in &block.transactions {
            self.validate_transaction(tx)?;
        }

        // Two transactions in the same block could each pass validation
        // against the stored UTXO set and still spend the same output.
        let mut spent_outputs: HashSet<(Vec<u8>, u32)> = HashSet::new();
        for tx in &block.transactions {
            for input in &tx.inputs {
                if !spent_outputs.insert((input.prev_tx_hash.clone(), input.prev_out_index)) {
                    return Err(NodeError::DoubleSpend(format!(
                        "output {}_{} consumed twice within one block",
                        HEXLOWER.encode(&input.prev_tx_hash),
                        input.prev_out_index
                    )));
                }
            }
        }

        Ok(())
    }

    /// Decide whether a transaction is spendable against the current UTXO
    /// set. Coinbase transactions (no inputs) mint and are exempt from the
    /// input checks; only genesis carries one.
    pub fn validate_transaction(&self, tx: &Transaction) -> Result<()> {
        if !verify_transaction(tx) {
            return Err(NodeError::Verification(
                "invalid transaction signature".to_string(),
            ));
        }
        if tx.is_coinbase() {
            return Ok(());
        }

        let mut sum_inputs: i64 = 0;
        for input in &tx.inputs {
            // The key is built from the input's own prev_out_index field,
            // never from its position in the input array.
            let key = utxo_key(&HEXLOWER.encode(&input.prev_tx_hash), input.prev_out_index);
            let utxo = self.utxo_store.get(&key)?;
            if utxo.spent {
                return Err(NodeError::DoubleSpend(format!(
                    "input {key} is already spent"
                )));
            }
            sum_inputs += utxo.amount;
        }

        let sum_outputs: i64 = tx.outputs.iter().map(|output| output.amount).sum();
        if sum_inputs < sum_outputs {
            return Err(NodeError::InsufficientFunds {
                required: sum_outputs,
                available: sum_inputs,
            });
        }
        Ok(())
    }
}

// The genesis block is built, not synced: header at height 0 with a zero
// prev-hash and timestamp, one coinbase output paying the genesis address.
// It is signed once, after the coinbase is attached, so the root hash in
// the signed header commits to it.
fn create_genesis_block() -> Result<Block> {
    let private_key = genesis_private_key();

    let coinbase = Transaction {
        version: 1,
        inputs: vec![],
        outputs: vec![TxOutput {
            amount: GENESIS_AMOUNT,
            address: private_key.public().address().to_vec(),
        }],
    };

    let mut block = Block {
        header: Header {
            version: 1,
            height: 0,
            prev_hash: vec![0u8; 32],
            root_hash: vec![],
            timestamp: 0,
        },
        public_key: vec![],
        signature: vec![],
        transactions: vec![coinbase],
    };
    sign_block(private_key, &mut block)?;
    Ok(block)
}
