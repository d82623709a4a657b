/*!
 * Credential policy
 *
 * Responsibility:
 * - credential → grant の静的な対応表（wildcard / 固定 grant）
 * - 起動時に一度だけ組み立て、以降は read-only で共有する
 * - credential は digest として保持し、平文は残さない
 *
 * Public API:
 * - Policy, PolicyBuilder, PolicyError
 * - CredentialDigest
 * - PolicyFile（JSON 形式）
 */

mod digest;
mod file;

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use thiserror::Error;

use crate::claims::ClaimSet;

pub use digest::CredentialDigest;
pub use file::{CredentialRef, GrantEntry, PolicyFile};

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("failed to read policy file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed policy document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid sha256 digest in policy: {0}")]
    Digest(#[from] hex::FromHexError),
    #[error("credential {0:?} is listed more than once")]
    Duplicate(CredentialDigest),
}

/// Static credential policy.
#[derive(Debug, Clone, Default)]
pub struct Policy {
    wildcard: HashSet<CredentialDigest>,
    grants: HashMap<CredentialDigest, ClaimSet>,
}

impl Policy {
    pub fn builder() -> PolicyBuilder {
        PolicyBuilder::default()
    }

    pub fn is_wildcard(&self, digest: &CredentialDigest) -> bool {
        self.wildcard.contains(digest)
    }

    pub fn grant(&self, digest: &CredentialDigest) -> Option<&ClaimSet> {
        self.grants.get(digest)
    }

    pub fn wildcard_count(&self) -> usize {
        self.wildcard.len()
    }

    pub fn grant_count(&self) -> usize {
        self.grants.len()
    }
}

/// Accumulates entries from config and policy files.
///
/// A credential may appear in exactly one place: either as a wildcard or as one grant.
#[derive(Debug, Default)]
pub struct PolicyBuilder {
    policy: Policy,
}

impl PolicyBuilder {
    pub fn wildcard_token(self, token: &str) -> Result<Self, PolicyError> {
        self.wildcard_digest(CredentialDigest::of(token.as_bytes()))
    }

    pub fn wildcard_digest(mut self, digest: CredentialDigest) -> Result<Self, PolicyError> {
        self.ensure_unused(&digest)?;
        self.policy.wildcard.insert(digest);
        Ok(self)
    }

    pub fn grant_token(self, token: &str, claims: ClaimSet) -> Result<Self, PolicyError> {
        self.grant_digest(CredentialDigest::of(token.as_bytes()), claims)
    }

    pub fn grant_digest(
        mut self,
        digest: CredentialDigest,
        claims: ClaimSet,
    ) -> Result<Self, PolicyError> {
        self.ensure_unused(&digest)?;
        self.policy.grants.insert(digest, claims);
        Ok(self)
    }

    /// Merge every entry of a parsed policy file.
    pub fn file(mut self, file: PolicyFile) -> Result<Self, PolicyError> {
        for credential in file.wildcard {
            self = self.wildcard_digest(credential.digest()?)?;
        }
        for entry in file.grants {
            let digest = entry.credential.digest()?;
            self = self.grant_digest(digest, entry.into_claim_set())?;
        }
        Ok(self)
    }

    pub fn build(self) -> Policy {
        self.policy
    }

    fn ensure_unused(&self, digest: &CredentialDigest) -> Result<(), PolicyError> {
        if self.policy.wildcard.contains(digest) || self.policy.grants.contains_key(digest) {
            return Err(PolicyError::Duplicate(*digest));
        }
        Ok(())
    }
}
