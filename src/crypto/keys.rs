use crate::error::{NodeError, Result};
use data_encoding::HEXLOWER;
use ring::rand::{SecureRandom, SystemRandom};
use ring::signature::{Ed25519KeyPair, KeyPair, UnparsedPublicKey, ED25519};
use zeroize::Zeroize;

pub const SEED_LEN: usize = 32;
/// 32 seed bytes followed by the 32 public key bytes
pub const PRIV_KEY_LEN: usize = 64;
pub const PUB_KEY_LEN: usize = 32;
pub const SIGNATURE_LEN: usize = 64;
pub const ADDRESS_LEN: usize = 20;

/// An Ed25519 private key, always backed by its 32-byte seed.
///
/// The key is deliberately not `Clone`: share it behind an `Arc` instead of
/// copying seed material around. The seed is wiped from memory on drop.
pub struct PrivateKey {
    seed: [u8; SEED_LEN],
    key: Ed25519KeyPair,
}

impl PrivateKey {
    /// Generate a new private key from the system RNG.
    ///
    /// Failure to read entropy is fatal for whoever needed the key.
    pub fn generate() -> Result<PrivateKey> {
        let rng = SystemRandom::new();
        let mut seed = [0u8; SEED_LEN];
        rng.fill(&mut seed)
            .map_err(|_| NodeError::Entropy("failed to read from system RNG".to_string()))?;
        Self::from_seed(&seed)
    }

    /// Derive a private key from a 32-byte seed.
    pub fn from_seed(seed: &[u8]) -> Result<PrivateKey> {
        if seed.len() != SEED_LEN {
            return Err(NodeError::InvalidLength {
                expected: SEED_LEN,
                actual: seed.len(),
            });
        }
        let key = Ed25519KeyPair::from_seed_unchecked(seed)
            .map_err(|e| NodeError::Verification(format!("seed rejected: {e}")))?;
        let mut fixed = [0u8; SEED_LEN];
        fixed.copy_from_slice(seed);
        Ok(PrivateKey { seed: fixed, key })
    }

    /// Derive a private key from a hex-encoded 32-byte seed.
    pub fn from_hex(s: &str) -> Result<PrivateKey> {
        let seed = HEXLOWER
            .decode(s.as_bytes())
            .map_err(|e| NodeError::Serialization(format!("invalid hex seed: {e}")))?;
        Self::from_seed(&seed)
    }

    pub fn sign(&self, msg: &[u8]) -> Signature {
        let sig = self.key.sign(msg);
        let mut bytes = [0u8; SIGNATURE_LEN];
        bytes.copy_from_slice(sig.as_ref());
        Signature { value: bytes }
    }

    pub fn public(&self) -> PublicKey {
        let mut bytes = [0u8; PUB_KEY_LEN];
        bytes.copy_from_slice(self.key.public_key().as_ref());
        PublicKey { key: bytes }
    }

    /// The 64-byte private material: seed followed by public key.
    pub fn to_bytes(&self) -> [u8; PRIV_KEY_LEN] {
        let mut bytes = [0u8; PRIV_KEY_LEN];
        bytes[..SEED_LEN].copy_from_slice(&self.seed);
        bytes[SEED_LEN..].copy_from_slice(self.key.public_key().as_ref());
        bytes
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.seed.zeroize();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKey {
    key: [u8; PUB_KEY_LEN],
}

impl PublicKey {
    pub fn from_bytes(b: &[u8]) -> Result<PublicKey> {
        if b.len() != PUB_KEY_LEN {
            return Err(NodeError::InvalidLength {
                expected: PUB_KEY_LEN,
                actual: b.len(),
            });
        }
        let mut key = [0u8; PUB_KEY_LEN];
        key.copy_from_slice(b);
        Ok(PublicKey { key })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.key
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.key.to_vec()
    }

    /// The address is the last 20 bytes of the public key. A lightweight
    /// fingerprint, not a cryptographic commitment to the full key.
    pub fn address(&self) -> Address {
        let mut value = [0u8; ADDRESS_LEN];
        value.copy_from_slice(&self.key[PUB_KEY_LEN - ADDRESS_LEN..]);
        Address { value }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    value: [u8; SIGNATURE_LEN],
}

impl Signature {
    pub fn from_bytes(b: &[u8]) -> Result<Signature> {
        if b.len() != SIGNATURE_LEN {
            return Err(NodeError::InvalidLength {
                expected: SIGNATURE_LEN,
                actual: b.len(),
            });
        }
        let mut value = [0u8; SIGNATURE_LEN];
        value.copy_from_slice(b);
        Ok(Signature { value })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.value
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.value.to_vec()
    }

    /// Check this signature over `msg` under `public_key`.
    pub fn verify(&self, public_key: &PublicKey, msg: &[u8]) -> bool {
        let peer_public_key = UnparsedPublicKey::new(&ED25519, public_key.as_bytes());
        peer_public_key.verify(msg, &self.value).is_ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    value: [u8; ADDRESS_LEN],
}

impl Address {
    pub fn from_bytes(b: &[u8]) -> Result<Address> {
        if b.len() != ADDRESS_LEN {
            return Err(NodeError::InvalidLength {
                expected: ADDRESS_LEN,
                actual: b.len(),
            });
        }
        let mut value = [0u8; ADDRESS_LEN];
        value.copy_from_slice(b);
        Ok(Address { value })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.value
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.value.to_vec()
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", HEXLOWER.encode(&self.value))
    }
}
