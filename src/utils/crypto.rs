use ring::digest::{Context, SHA256};

use crate::error::{NodeError, Result};
use std::time::{SystemTime, UNIX_EPOCH};

/// Nanoseconds since the Unix epoch, as used in block header timestamps.
pub fn current_timestamp_nanos() -> Result<i64> {
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| NodeError::Config(format!("system time error: {e}")))?
        .as_nanos();

    // Ensure the timestamp fits in i64
    if duration > i64::MAX as u128 {
        return Err(NodeError::Config("timestamp overflow".to_string()));
    }

    Ok(duration as i64)
}

pub fn sha256_digest(data: &[u8]) -> Vec<u8> {
    let mut context = Context::new(&SHA256);
    context.update(data);
    let digest = context.finish();
    digest.as_ref().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_digest_length() {
        assert_eq!(sha256_digest(b"meshchain").len(), 32);
    }

    #[test]
    fn test_sha256_digest_deterministic() {
        assert_eq!(sha256_digest(b"same input"), sha256_digest(b"same input"));
        assert_ne!(sha256_digest(b"input a"), sha256_digest(b"input b"));
    }

    #[test]
    fn test_current_timestamp_is_positive() {
        assert!(current_timestamp_nanos().unwrap() > 0);
    }
}
