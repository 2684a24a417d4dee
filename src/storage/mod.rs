//! Keyed storage behind small interfaces
//!
//! Blocks, transactions and UTXOs each sit behind a trait with in-memory
//! reference implementations. A persistent back-end can replace any of
//! them without changes to the chain.

pub mod mempool;
pub mod stores;

pub use mempool::Mempool;
pub use stores::{
    utxo_key, BlockStore, MemoryBlockStore, MemoryTxStore, MemoryUtxoStore, TxStore, Utxo,
    UtxoStore,
};
