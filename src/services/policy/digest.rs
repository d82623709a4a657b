use std::fmt;

use sha2::{Digest, Sha256};

/// SHA-256 of a credential. Lookup key for the policy tables.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CredentialDigest([u8; 32]);

impl CredentialDigest {
    pub fn of(credential: &[u8]) -> Self {
        let mut h = Sha256::new();
        h.update(credential);
        Self(h.finalize().into())
    }

    /// Parse a 64-char hex digest as written in policy files.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut out = [0u8; 32];
        hex::decode_to_slice(s.trim(), &mut out)?;
        Ok(Self(out))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for CredentialDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // prefix だけ出す（相関用）
        write!(f, "CredentialDigest({}…)", &self.to_hex()[..8])
    }
}
