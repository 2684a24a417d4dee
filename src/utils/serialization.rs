// Bincode with the standard configuration: the deterministic, bit-exact
// encoding behind every hash pre-image and every block/transaction payload
// on the wire. Two nodes serializing the same value get the same bytes.
use crate::error::{NodeError, Result};
use serde::{Deserialize, Serialize};

/// Serialize a value with the standard bincode configuration
pub fn serialize<T: Serialize + bincode::Encode>(data: &T) -> Result<Vec<u8>> {
    let config = bincode::config::standard();
    bincode::encode_to_vec(data, config)
        .map_err(|e| NodeError::Serialization(format!("serialization failed: {e}")))
}

/// Deserialize a value with the standard bincode configuration
pub fn deserialize<T>(bytes: &[u8]) -> Result<T>
where
    T: for<'de> Deserialize<'de> + bincode::Decode<()>,
{
    let config = bincode::config::standard();
    let (data, _) = bincode::decode_from_slice(bytes, config)
        .map_err(|e| NodeError::Serialization(format!("deserialization failed: {e}")))?;
    Ok(data)
}
