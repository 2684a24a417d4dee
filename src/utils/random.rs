//! Random fixtures for tests.
//!
//! These helpers panic if the system RNG is unavailable; they are only
//! meant for test code and the demo driver.

use crate::core::{Block, Header, Transaction, TxInput, TxOutput};
use crate::crypto::PrivateKey;
use ring::rand::{SecureRandom, SystemRandom};

/// A random 32-byte hash.
pub fn random_hash() -> Vec<u8> {
    let rng = SystemRandom::new();
    let mut hash = vec![0u8; 32];
    rng.fill(&mut hash).expect("system RNG unavailable");
    hash
}

/// A header with random linkage and a random height in `0..1000`.
pub fn random_header() -> Header {
    let height_bytes = random_hash();
    let height = u32::from_le_bytes([
        height_bytes[0],
        height_bytes[1],
        height_bytes[2],
        height_bytes[3],
    ]) % 1000;
    Header {
        version: 1,
        height: height as i32,
        prev_hash: random_hash(),
        root_hash: random_hash(),
        timestamp: crate::utils::current_timestamp_nanos().expect("system clock unavailable"),
    }
}

/// An unsigned block with a random header and no transactions.
pub fn random_block() -> Block {
    Block {
        header: random_header(),
        public_key: vec![],
        signature: vec![],
        transactions: vec![],
    }
}

/// An unsigned single-input transaction spending a random previous output,
/// paying 5 to `to` and 95 back to the sender.
pub fn random_transaction(from: &PrivateKey, to: &PrivateKey) -> Transaction {
    Transaction {
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
    }
}
