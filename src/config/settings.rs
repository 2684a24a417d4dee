use crate::crypto::PrivateKey;
use std::env;
use std::sync::Arc;
use std::time::Duration;

/// Protocol version string advertised in handshakes
pub const PROTOCOL_VERSION: &str = "meshchain-0.1";

/// How often a validator drains the mempool into a block
pub const BLOCK_TIME: Duration = Duration::from_secs(5);

const DEFAULT_NODE_ADDR: &str = "127.0.0.1:3000";
const NODE_ADDRESS_KEY: &str = "NODE_ADDRESS";

/// Per-instance node configuration.
///
/// One process can host several nodes (the demo launcher does), so this is
/// a plain value handed to each `Node` rather than process-global state.
#[derive(Clone)]
pub struct NodeConfig {
    /// Protocol version string sent in handshakes
    pub version: String,
    /// Address this node listens on, and the identity peers know it by
    pub listen_addr: String,
    /// Seed addresses to bootstrap from at startup
    pub bootstrap_addrs: Vec<String>,
    /// Present on validator nodes only; the key blocks are signed with
    pub private_key: Option<Arc<PrivateKey>>,
    /// Validator tick interval
    pub block_time: Duration,
}

impl NodeConfig {
    pub fn new(listen_addr: impl Into<String>) -> NodeConfig {
        NodeConfig {
            version: PROTOCOL_VERSION.to_string(),
            listen_addr: listen_addr.into(),
            bootstrap_addrs: Vec::new(),
            private_key: None,
            block_time: BLOCK_TIME,
        }
    }

    pub fn with_bootstrap(mut self, addrs: Vec<String>) -> NodeConfig {
        self.bootstrap_addrs = addrs;
        self
    }

    pub fn with_validator(mut self, private_key: PrivateKey) -> NodeConfig {
        self.private_key = Some(Arc::new(private_key));
        self
    }

    pub fn with_block_time(mut self, block_time: Duration) -> NodeConfig {
        self.block_time = block_time;
        self
    }
}

/// The listen address from the environment, or the default.
pub fn default_listen_addr() -> String {
    env::var(NODE_ADDRESS_KEY).unwrap_or_else(|_| DEFAULT_NODE_ADDR.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NodeConfig::new("127.0.0.1:3000");
        assert_eq!(config.version, PROTOCOL_VERSION);
        assert_eq!(config.block_time, BLOCK_TIME);
        assert!(config.bootstrap_addrs.is_empty());
        assert!(config.private_key.is_none());
    }

    #[test]
    fn test_builder_setters() {
        let key = PrivateKey::generate().unwrap();
        let config = NodeConfig::new("127.0.0.1:3001")
            .with_bootstrap(vec!["127.0.0.1:3000".to_string()])
            .with_validator(key)
            .with_block_time(Duration::from_millis(100));

        assert_eq!(config.bootstrap_addrs.len(), 1);
        assert!(config.private_key.is_some());
        assert_eq!(config.block_time, Duration::from_millis(100));
    }
}
