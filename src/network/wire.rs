use serde::{Deserialize, Serialize};

/// Handshake record: who a node is and which peers it already knows.
///
/// The advertised `peer_list` is what makes discovery transitive; a dialer
/// bootstraps against every address in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct Version {
    pub version: String,
    pub height: i32,
    pub listen_addr: String,
    pub peer_list: Vec<String>,
}

/// Empty acknowledgment for accepted transactions and blocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct Ack {}

/// One RPC request. Block and transaction payloads travel as their
/// deterministic binary encoding inside the JSON envelope.
#[derive(Debug, Serialize, Deserialize)]
pub enum Package {
    Handshake { version: Version },
    Tx { transaction: Vec<u8> },
    Block { block: Vec<u8> },
}

/// One RPC response. `Error` carries the rejection text back to the caller.
#[derive(Debug, Serialize, Deserialize)]
pub enum Reply {
    Version(Version),
    Ack(Ack),
    Error(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_serialization() {
        let pkg = Package::Handshake {
            version: Version {
                version: "meshchain-0.1".to_string(),
                height: 0,
                listen_addr: "127.0.0.1:3000".to_string(),
                peer_list: vec!["127.0.0.1:4000".to_string()],
            },
        };

        let serialized = serde_json::to_string(&pkg).unwrap();
        let deserialized: Package = serde_json::from_str(&serialized).unwrap();
        match deserialized {
            Package::Handshake { version } => {
                assert_eq!(version.listen_addr, "127.0.0.1:3000");
                assert_eq!(version.peer_list.len(), 1);
            }
            other => panic!("unexpected package: {other:?}"),
        }
    }

    #[test]
    fn test_reply_serialization() {
        let reply = Reply::Error("previous hash mismatch".to_string());
        let serialized = serde_json::to_string(&reply).unwrap();
        let deserialized: Reply = serde_json::from_str(&serialized).unwrap();
        match deserialized {
            Reply::Error(msg) => assert_eq!(msg, "previous hash mismatch"),
            other => panic!("unexpected reply: {other:?}"),
        }
    }
}
