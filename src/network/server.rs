use crate::core::{Block, Transaction};
use crate::error::{NodeError, Result};
use crate::network::node::Node;
use crate::network::wire::{Package, Reply};
use log::{error, info};
use serde_json::Deserializer;
use std::io::BufReader;
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const READ_TIMEOUT: u64 = 60;

/// The network listener that exposes the RPC surface and binds it to the
/// node's handlers. A thin adapter: decode, dispatch, reply.
pub struct Server;

impl Server {
    /// Bind the node's listen address. Kept separate from `serve` so a
    /// caller can fail fast on a taken port before spawning anything.
    pub fn bind(node: &Node) -> Result<TcpListener> {
        let listener = TcpListener::bind(node.listen_addr()).map_err(|e| {
            NodeError::Transport(format!("failed to bind to {}: {e}", node.listen_addr()))
        })?;
        Ok(listener)
    }

    /// Accept connections forever, one handler thread per connection.
    pub fn serve(node: Arc<Node>, listener: TcpListener) -> Result<()> {
        info!("node listening on {}", node.listen_addr());

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    let node = Arc::clone(&node);
                    thread::spawn(move || {
                        if let Err(e) = Self::handle_connection(node, stream) {
                            error!("error handling connection: {e}");
                        }
                    });
                }
                Err(e) => {
                    error!("error accepting connection: {e}");
                }
            }
        }

        Ok(())
    }

    fn handle_connection(node: Arc<Node>, stream: TcpStream) -> Result<()> {
        stream
            .set_read_timeout(Some(Duration::from_secs(READ_TIMEOUT)))
            .map_err(|e| NodeError::Transport(format!("failed to set read timeout: {e}")))?;

        let reader = BufReader::new(&stream);
        let pkg_reader = Deserializer::from_reader(reader).into_iter::<Package>();

        for pkg in pkg_reader {
            let pkg = pkg
                .map_err(|e| NodeError::Transport(format!("failed to decode request: {e}")))?;
            let reply = Self::dispatch(&node, pkg);
            serde_json::to_writer(&stream, &reply)
                .map_err(|e| NodeError::Transport(format!("failed to send reply: {e}")))?;
        }

        let _ = stream.shutdown(Shutdown::Both);
        Ok(())
    }

    // Every rejection travels back as Reply::Error; the connection itself
    // stays healthy.
    fn dispatch(node: &Arc<Node>, pkg: Package) -> Reply {
        match pkg {
            Package::Handshake { version } => match node.handshake(version) {
                Ok(own_version) => Reply::Version(own_version),
                Err(e) => Reply::Error(e.to_string()),
            },
            Package::Tx { transaction } => {
                match Transaction::deserialize(&transaction)
                    .and_then(|tx| node.handle_transaction(tx))
                {
                    Ok(ack) => Reply::Ack(ack),
                    Err(e) => Reply::Error(e.to_string()),
                }
            }
            Package::Block { block } => {
                match Block::deserialize(&block).and_then(|block| node.handle_block(block)) {
                    Ok(ack) => Reply::Ack(ack),
                    Err(e) => Reply::Error(e.to_string()),
                }
            }
        }
    }
}

/// Bring a node fully online: bind, spawn bootstrap and validator tasks,
/// then serve the RPC surface on the calling thread.
pub fn run(node: Arc<Node>) -> Result<()> {
    let listener = Server::bind(&node)?;
    node.start_background_tasks();
    Server::serve(node, listener)
}
