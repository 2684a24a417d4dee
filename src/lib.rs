//! # Meshchain - A Minimal Peer-to-Peer UTXO Blockchain Node
//!
//! A process that participates in a gossip network of identical peers,
//! accepts signed transactions, packages them into cryptographically
//! chained blocks under a rotating validator role, and maintains a
//! consistent view of unspent outputs.
//!
//! ## How the Code Is Organized
//! - `crypto/`: Ed25519 keys, signatures, and address derivation
//! - `core/`: blocks, transactions, Merkle commitments, and the chain
//! - `storage/`: the block/tx/UTXO store interfaces and the mempool
//! - `network/`: handshake, peer table, gossip, validator loop, server
//! - `config/`: per-node configuration
//! - `cli/`: the command-line launcher
//! - `utils/`: hashing, timestamps, deterministic serialization, fixtures
//!
//! ## The Moving Parts
//! A transaction submitted to any node is validated, deduplicated through
//! the mempool, and gossiped to every peer. Nodes holding a validator key
//! drain their mempool on a fixed tick, sign the resulting block, append
//! it locally and broadcast it. Peer discovery is transitive: each
//! handshake returns the remote's peer list, and every new peer seeds
//! another bootstrap round until the tables converge.

pub mod cli;
pub mod config;
pub mod core;
pub mod crypto;
pub mod error;
pub mod network;
pub mod storage;
pub mod utils;

// Re-export commonly used types for convenience
pub use crate::cli::{Command, Opt};
pub use crate::config::{default_listen_addr, NodeConfig, BLOCK_TIME, PROTOCOL_VERSION};
pub use crate::core::{
    genesis_private_key, hash_block, hash_header, hash_transaction, merkle_root, sign_block,
    sign_transaction, verify_block, verify_merkle, verify_transaction, Block, Chain, Header,
    HeaderList, MerkleTree, Transaction, TxInput, TxOutput, GENESIS_AMOUNT, GENESIS_SEED,
};
pub use crate::crypto::{Address, PrivateKey, PublicKey, Signature};
pub use crate::error::{NodeError, Result};
pub use crate::network::{run, Ack, Node, Package, PeerClient, Reply, Server, Version};
pub use crate::storage::{
    utxo_key, BlockStore, MemoryBlockStore, MemoryTxStore, MemoryUtxoStore, Mempool, TxStore,
    Utxo, UtxoStore,
};
