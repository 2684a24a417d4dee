use crate::core::{Block, Transaction};
use crate::error::{NodeError, Result};
use crate::network::wire::{Ack, Package, Reply, Version};
use serde_json::Deserializer;
use std::io::{BufReader, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

const DIAL_TIMEOUT: u64 = 5000;
const RPC_TIMEOUT: u64 = 5000;

/// A handle onto a remote peer's RPC surface.
///
/// Dialing is lazy: constructing a client performs no I/O, each call opens
/// a fresh connection, writes one `Package` and reads one `Reply`.
#[derive(Debug, Clone)]
pub struct PeerClient {
    addr: String,
}

impl PeerClient {
    pub fn new(addr: impl Into<String>) -> PeerClient {
        PeerClient { addr: addr.into() }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Exchange version records; the remote answers with its own.
    pub fn handshake(&self, version: &Version) -> Result<Version> {
        let pkg = Package::Handshake {
            version: version.clone(),
        };
        match self.call(&pkg)? {
            Reply::Version(remote) => Ok(remote),
            Reply::Error(msg) => Err(NodeError::Transport(format!(
                "handshake rejected by {}: {msg}",
                self.addr
            ))),
            other => Err(NodeError::Transport(format!(
                "unexpected handshake reply from {}: {other:?}",
                self.addr
            ))),
        }
    }

    /// Forward a transaction to the peer.
    pub fn handle_transaction(&self, tx: &Transaction) -> Result<Ack> {
        let pkg = Package::Tx {
            transaction: tx.serialize()?,
        };
        self.expect_ack(&pkg)
    }

    /// Deliver a block to the peer.
    pub fn handle_block(&self, block: &Block) -> Result<Ack> {
        let pkg = Package::Block {
            block: block.serialize()?,
        };
        self.expect_ack(&pkg)
    }

    fn expect_ack(&self, pkg: &Package) -> Result<Ack> {
        match self.call(pkg)? {
            Reply::Ack(ack) => Ok(ack),
            Reply::Error(msg) => Err(NodeError::Verification(format!(
                "rejected by {}: {msg}",
                self.addr
            ))),
            other => Err(NodeError::Transport(format!(
                "unexpected reply from {}: {other:?}",
                self.addr
            ))),
        }
    }

    // One request/response round trip on a fresh connection.
    fn call(&self, pkg: &Package) -> Result<Reply> {
        let socket_addr = self
            .addr
            .parse::<SocketAddr>()
            .map_err(|e| NodeError::Transport(format!("invalid address {}: {e}", self.addr)))?;

        let mut stream =
            TcpStream::connect_timeout(&socket_addr, Duration::from_millis(DIAL_TIMEOUT))
                .map_err(|e| {
                    NodeError::Transport(format!("failed to connect to {}: {e}", self.addr))
                })?;
        stream
            .set_write_timeout(Some(Duration::from_millis(RPC_TIMEOUT)))
            .map_err(|e| NodeError::Transport(format!("failed to set write timeout: {e}")))?;
        stream
            .set_read_timeout(Some(Duration::from_millis(RPC_TIMEOUT)))
            .map_err(|e| NodeError::Transport(format!("failed to set read timeout: {e}")))?;

        serde_json::to_writer(&stream, pkg)
            .map_err(|e| NodeError::Transport(format!("failed to send request: {e}")))?;
        stream
            .flush()
            .map_err(|e| NodeError::Transport(format!("failed to flush request: {e}")))?;

        let reader = BufReader::new(&stream);
        let mut replies = Deserializer::from_reader(reader).into_iter::<Reply>();
        let reply = replies
            .next()
            .ok_or_else(|| {
                NodeError::Transport(format!("connection to {} closed without reply", self.addr))
            })?
            .map_err(|e| NodeError::Transport(format!("failed to read reply: {e}")))?;

        let _ = stream.shutdown(Shutdown::Both);
        Ok(reply)
    }
}
