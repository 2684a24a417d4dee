//! The ledger core: blocks, transactions, Merkle commitments, and the
//! chain state machine that ties them to the UTXO set.

pub mod block;
pub mod chain;
pub mod merkle;
pub mod transaction;

pub use block::{hash_block, hash_header, sign_block, verify_block, verify_merkle, Block, Header};
pub use chain::{genesis_private_key, Chain, HeaderList, GENESIS_AMOUNT, GENESIS_SEED};
pub use merkle::{merkle_root, MerkleTree};
pub use transaction::{
    hash_transaction, sign_transaction, verify_transaction, Transaction, TxInput, TxOutput,
};
