//! Shared helpers: hashing, timestamps, deterministic serialization,
//! and random fixtures for tests.

pub mod crypto;
pub mod random;
pub mod serialization;

pub use crypto::{current_timestamp_nanos, sha256_digest};
pub use random::{random_block, random_hash, random_header, random_transaction};
pub use serialization::{deserialize, serialize};
