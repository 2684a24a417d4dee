pub mod settings;

pub use settings::{default_listen_addr, NodeConfig, BLOCK_TIME, PROTOCOL_VERSION};
