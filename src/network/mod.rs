//! Peer-to-peer networking
//!
//! Nodes speak a small JSON-framed RPC over TCP: a handshake that exchanges
//! `Version` records and establishes a bidirectional peering, transaction
//! gossip, and block delivery from the validator.

pub mod client;
pub mod node;
pub mod server;
pub mod wire;

pub use client::PeerClient;
pub use node::Node;
pub use server::{run, Server};
pub use wire::{Ack, Package, Reply, Version};
