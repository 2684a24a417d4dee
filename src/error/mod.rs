//! Error handling for the node
//!
//! A single error type covers every layer: crypto primitives, the ledger
//! state machine, storage, and the peer network.

use std::fmt;

/// Result type alias for node operations
pub type Result<T> = std::result::Result<T, NodeError>;

/// Error kinds surfaced by node operations
#[derive(Debug, Clone)]
pub enum NodeError {
    /// A seed, key or signature had the wrong number of bytes
    InvalidLength { expected: usize, actual: usize },
    /// The system RNG could not be read
    Entropy(String),
    /// A signature, Merkle root or prev-hash check failed
    Verification(String),
    /// A block, transaction or UTXO was not found
    NotFound(String),
    /// Transaction outputs exceed its inputs
    InsufficientFunds { required: i64, available: i64 },
    /// An input references a UTXO that is already spent
    DoubleSpend(String),
    /// A requested block height exceeds the chain tip
    HeightOutOfRange { requested: i32, tip: i32 },
    /// Network communication errors
    Transport(String),
    /// Serialization/deserialization errors
    Serialization(String),
    /// Configuration errors
    Config(String),
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeError::InvalidLength { expected, actual } => {
                write!(f, "invalid length: expected {expected} bytes, got {actual}")
            }
            NodeError::Entropy(msg) => write!(f, "entropy failure: {msg}"),
            NodeError::Verification(msg) => write!(f, "verification failed: {msg}"),
            NodeError::NotFound(msg) => write!(f, "not found: {msg}"),
            NodeError::InsufficientFunds {
                required,
                available,
            } => {
                write!(
                    f,
                    "insufficient funds: required {required}, available {available}"
                )
            }
            NodeError::DoubleSpend(msg) => write!(f, "double spend: {msg}"),
            NodeError::HeightOutOfRange { requested, tip } => {
                write!(f, "height {requested} out of range, tip is {tip}")
            }
            NodeError::Transport(msg) => write!(f, "transport error: {msg}"),
            NodeError::Serialization(msg) => write!(f, "serialization error: {msg}"),
            NodeError::Config(msg) => write!(f, "configuration error: {msg}"),
        }
    }
}

impl std::error::Error for NodeError {}

impl From<std::io::Error> for NodeError {
    fn from(err: std::io::Error) -> Self {
        NodeError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for NodeError {
    fn from(err: serde_json::Error) -> Self {
        NodeError::Serialization(err.to_string())
    }
}

impl From<bincode::error::EncodeError> for NodeError {
    fn from(err: bincode::error::EncodeError) -> Self {
        NodeError::Serialization(err.to_string())
    }
}

impl From<bincode::error::DecodeError> for NodeError {
    fn from(err: bincode::error::DecodeError) -> Self {
        NodeError::Serialization(err.to_string())
    }
}
