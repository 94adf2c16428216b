use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Material used to derive a [`Principal`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentityMaterial {
    /// A human-readable account name (e.g. supplied by a host's login layer).
    Name(String),
    /// A 32-byte public key, for hosts that authenticate callers by key.
    PublicKey([u8; 32]),
}

impl IdentityMaterial {
    /// Public-key material from 64 hex characters.
    pub fn public_key_from_hex(s: &str) -> Result<Self, TypeError> {
        decode_32(s).map(Self::PublicKey)
    }
}

/// Opaque identity of the caller of an operation.
///
/// A `Principal` is derived deterministically from [`IdentityMaterial`]
/// using BLAKE3, so the same name or key always maps to the same identity.
/// The service only ever compares principals for equality; it never looks
/// inside them.
///
/// Serialized as a 64-character hex string.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Principal {
    hash: [u8; 32],
}

impl Principal {
    /// Derive a `Principal` from identity material.
    pub fn derive(material: &IdentityMaterial) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"autodb-principal-v1:");
        match material {
            IdentityMaterial::Name(name) => {
                hasher.update(b"name:");
                hasher.update(name.as_bytes());
            }
            IdentityMaterial::PublicKey(pk) => {
                hasher.update(b"pubkey:");
                hasher.update(pk);
            }
        }
        Self {
            hash: *hasher.finalize().as_bytes(),
        }
    }

    /// Shorthand for `derive(&IdentityMaterial::Name(name))`.
    pub fn from_name(name: &str) -> Self {
        Self::derive(&IdentityMaterial::Name(name.to_string()))
    }

    /// The all-zero principal used when a host supplies no caller.
    pub const fn anonymous() -> Self {
        Self { hash: [0u8; 32] }
    }

    pub fn is_anonymous(&self) -> bool {
        self.hash == [0u8; 32]
    }

    /// Full hex-encoded string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.hash)
    }

    /// Short identifier (first 8 hex characters).
    pub fn short_id(&self) -> String {
        format!("pr:{}", hex::encode(&self.hash[..4]))
    }

    /// Parse from a hex string (64 hex characters, optional `pr:` prefix).
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let s = s.strip_prefix("pr:").unwrap_or(s);
        decode_32(s).map(|hash| Self { hash })
    }
}

fn decode_32(s: &str) -> Result<[u8; 32], TypeError> {
    let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
    <[u8; 32]>::try_from(bytes.as_slice()).map_err(|_| TypeError::InvalidLength {
        expected: 32,
        actual: bytes.len(),
    })
}

impl TryFrom<String> for Principal {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Principal> for String {
    fn from(value: Principal) -> Self {
        value.to_hex()
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Principal({})", self.short_id())
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_id())
    }
}
