//! Ed25519 key and signature primitives
//!
//! Every identity in the network is an Ed25519 keypair: validators sign
//! block headers with it, wallets sign transaction inputs with it, and
//! the 20-byte address every output pays to is derived from it.

pub mod keys;

pub use keys::{
    Address, PrivateKey, PublicKey, Signature, ADDRESS_LEN, PRIV_KEY_LEN, PUB_KEY_LEN, SEED_LEN,
    SIGNATURE_LEN,
};
