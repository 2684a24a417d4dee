// A node is the composition of the chain, the mempool and the peer table.
// Handshakes feed the peer table, the peer table carries gossip, gossip
// fills the mempool, and the validator tick turns the mempool into blocks.

use crate::config::NodeConfig;
use crate::core::{hash_block, hash_transaction, sign_block, Block, Chain, Header, Transaction};
use crate::crypto::PrivateKey;
use crate::error::Result;
use crate::network::client::PeerClient;
use crate::network::wire::{Ack, Version};
use crate::storage::Mempool;
use crate::utils::current_timestamp_nanos;
use data_encoding::HEXLOWER;
use log::{debug, error, info, warn};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, Weak};
use std::thread;

pub struct Node {
    config: NodeConfig,
    chain: Arc<Chain>,
    mempool: Arc<Mempool>,
    /// ( K -> peer listen addr, V -> (client handle, peer's version) )
    peers: RwLock<HashMap<String, (PeerClient, Version)>>,
    shutdown: Arc<AtomicBool>,
    // Handle back to our own Arc so background tasks can be spawned from
    // &self methods without a reference cycle.
    self_ref: Weak<Node>,
}

impl Node {
    pub fn new(config: NodeConfig) -> Result<Arc<Node>> {
        let chain = Chain::in_memory()?;
        Ok(Arc::new_cyclic(|self_ref| Node {
            config,
            chain: Arc::new(chain),
            mempool: Arc::new(Mempool::new()),
            peers: RwLock::new(HashMap::new()),
            shutdown: Arc::new(AtomicBool::new(false)),
            self_ref: self_ref.clone(),
        }))
    }

    fn arc(&self) -> Arc<Node> {
        self.self_ref
            .upgrade()
            .expect("node outlived its Arc - this should never happen")
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn mempool(&self) -> &Mempool {
        &self.mempool
    }

    pub fn listen_addr(&self) -> &str {
        &self.config.listen_addr
    }

    pub fn is_validator(&self) -> bool {
        self.config.private_key.is_some()
    }

    /// Signal the validator loop to stop after its current tick.
    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// This node's current version record, peer list included.
    pub fn version(&self) -> Version {
        Version {
            version: self.config.version.clone(),
            height: self.chain.height(),
            listen_addr: self.config.listen_addr.clone(),
            peer_list: self.peer_list(),
        }
    }

    pub fn peer_list(&self) -> Vec<String> {
        let peers = self
            .peers
            .read()
            .expect("peer table lock poisoned - this should never happen");
        peers.keys().cloned().collect()
    }

    pub fn peer_count(&self) -> usize {
        self.peers
            .read()
            .expect("peer table lock poisoned - this should never happen")
            .len()
    }

    /// Spawn the background workers: bootstrap against the configured seed
    /// addresses and, on validator nodes, the block production loop.
    pub fn start_background_tasks(&self) {
        if !self.config.bootstrap_addrs.is_empty() {
            let node = self.arc();
            let seeds = self.config.bootstrap_addrs.clone();
            thread::spawn(move || node.bootstrap(seeds));
        }
        if let Some(private_key) = self.config.private_key.clone() {
            let node = self.arc();
            thread::spawn(move || node.validator_loop(private_key));
        }
    }

    /// Handle an inbound handshake: build a client handle for the sender's
    /// listen address (the dial-back), record the peering, answer with our
    /// own version so the dialer can discover our peers.
    pub fn handshake(&self, version: Version) -> Result<Version> {
        let client = PeerClient::new(version.listen_addr.clone());
        self.add_peer(client, version);
        Ok(self.version())
    }

    /// Handle an inbound transaction: reject what the ledger would never
    /// accept, dedupe through the mempool, and gossip first sightings on.
    pub fn handle_transaction(&self, tx: Transaction) -> Result<Ack> {
        let hash_hex = HEXLOWER.encode(&hash_transaction(&tx)?);
        // coinbase transactions mint; only the genesis block carries one
        if tx.is_coinbase() {
            return Err(crate::error::NodeError::Verification(
                "coinbase transactions cannot be submitted".to_string(),
            ));
        }
        self.chain.validate_transaction(&tx)?;

        if self.mempool.add(&tx) {
            debug!(
                "we={} received tx {hash_hex}, broadcasting to {} peers",
                self.config.listen_addr,
                self.peer_count()
            );
            let node = self.arc();
            thread::spawn(move || node.broadcast_transaction(&tx));
        }
        Ok(Ack {})
    }

    /// Handle an inbound block: append it and drop its transactions from
    /// the local mempool.
    pub fn handle_block(&self, block: Block) -> Result<Ack> {
        self.chain.add_block(&block)?;
        for tx in &block.transactions {
            let txid = HEXLOWER.encode(&hash_transaction(tx)?);
            self.mempool.remove(&txid);
        }
        info!(
            "we={} accepted block at height {}",
            self.config.listen_addr, block.header.height
        );
        Ok(Ack {})
    }

    /// Handshake with each address and record the resulting peerings.
    /// Best-effort: a dead seed is logged and skipped.
    pub fn bootstrap(&self, addrs: Vec<String>) {
        for addr in addrs {
            if !self.can_connect_with(&addr) {
                continue;
            }
            debug!("we={} dialing remote node {addr}", self.config.listen_addr);
            let client = PeerClient::new(addr.clone());
            match client.handshake(&self.version()) {
                Ok(remote_version) => {
                    self.add_peer(client, remote_version);
                }
                Err(e) => {
                    warn!(
                        "we={} bootstrap against {addr} failed: {e}",
                        self.config.listen_addr
                    );
                }
            }
        }
    }

    // A peering is recorded once per listen address, and never with
    // ourselves. New peers seed another bootstrap round over their
    // advertised peer list; the dedup checks are what terminate the cycle.
    fn add_peer(&self, client: PeerClient, version: Version) {
        let peer_addr = version.listen_addr.clone();
        let peer_list = version.peer_list.clone();
        {
            let mut peers = self
                .peers
                .write()
                .expect("peer table lock poisoned - this should never happen");
            if peer_addr == self.config.listen_addr || peers.contains_key(&peer_addr) {
                return;
            }
            peers.insert(peer_addr.clone(), (client, version));
        }
        debug!(
            "we={} new peer connected: {peer_addr}",
            self.config.listen_addr
        );

        // the bootstrap dials; it must run outside the peer lock
        if !peer_list.is_empty() {
            let node = self.arc();
            thread::spawn(move || node.bootstrap(peer_list));
        }
    }

    fn can_connect_with(&self, addr: &str) -> bool {
        if addr == self.config.listen_addr {
            return false;
        }
        let peers = self
            .peers
            .read()
            .expect("peer table lock poisoned - this should never happen");
        !peers.contains_key(addr)
    }

    // Snapshot the handles, drop the lock, then send. A failing peer is
    // skipped, never allowed to abort the rest of the broadcast.
    fn peer_clients(&self) -> Vec<PeerClient> {
        let peers = self
            .peers
            .read()
            .expect("peer table lock poisoned - this should never happen");
        peers.values().map(|(client, _)| client.clone()).collect()
    }

    fn broadcast_transaction(&self, tx: &Transaction) {
        for client in self.peer_clients() {
            if let Err(e) = client.handle_transaction(tx) {
                warn!(
                    "we={} broadcast to {} failed: {e}",
                    self.config.listen_addr,
                    client.addr()
                );
            }
        }
    }

    fn broadcast_block(&self, block: &Block) {
        for client in self.peer_clients() {
            if let Err(e) = client.handle_block(block) {
                warn!(
                    "we={} block broadcast to {} failed: {e}",
                    self.config.listen_addr,
                    client.addr()
                );
            }
        }
    }

    /// Periodic block production. Runs only on nodes configured with a
    /// private key; paced by the configured block time.
    fn validator_loop(&self, private_key: Arc<PrivateKey>) {
        info!(
            "we={} starting validator loop, block time {:?}",
            self.config.listen_addr, self.config.block_time
        );
        loop {
            thread::sleep(self.config.block_time);
            if self.shutdown.load(Ordering::SeqCst) {
                info!("we={} validator loop stopped", self.config.listen_addr);
                return;
            }
            if let Err(e) = self.produce_block(&private_key) {
                // The chain refused a block we signed ourselves: local
                // state is compromised, producing more would fork us.
                error!(
                    "we={} validator halting, failed to append own block: {e}",
                    self.config.listen_addr
                );
                return;
            }
        }
    }

    fn produce_block(&self, private_key: &PrivateKey) -> Result<()> {
        let drained = self.mempool.take_all();
        debug!(
            "we={} validator tick, {} pending transactions",
            self.config.listen_addr,
            drained.len()
        );
        if drained.is_empty() {
            return Ok(());
        }

        // A drained transaction can have gone stale since receipt (its
        // inputs spent by a block that arrived in between), and two drained
        // transactions can race for the same output. Filter both out here
        // rather than let our own block fail validation.
        let mut spent_outputs: HashSet<(Vec<u8>, u32)> = HashSet::new();
        let mut transactions = Vec::with_capacity(drained.len());
        'next_tx: for tx in drained {
            if let Err(e) = self.chain.validate_transaction(&tx) {
                warn!(
                    "we={} dropping stale mempool transaction: {e}",
                    self.config.listen_addr
                );
                continue;
            }
            for input in &tx.inputs {
                if !spent_outputs.insert((input.prev_tx_hash.clone(), input.prev_out_index)) {
                    warn!(
                        "we={} dropping conflicting mempool transaction",
                        self.config.listen_addr
                    );
                    continue 'next_tx;
                }
            }
            transactions.push(tx);
        }
        if transactions.is_empty() {
            return Ok(());
        }

        let tip = self.chain.tip()?;
        let mut block = Block {
            header: Header {
                version: 1,
                height: self.chain.height() + 1,
                prev_hash: hash_block(&tip)?,
                root_hash: vec![],
                timestamp: current_timestamp_nanos()?,
            },
            public_key: vec![],
            signature: vec![],
            transactions,
        };
        sign_block(private_key, &mut block)?;
        self.chain.add_block(&block)?;
        info!(
            "we={} produced block at height {} with {} transactions",
            self.config.listen_addr,
            block.header.height,
            block.transactions.len()
        );

        self.broadcast_block(&block);
        Ok(())
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }
}
