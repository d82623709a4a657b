/*
 * Responsibility
 * - policy file (JSON) の DTO と読み込み
 * - party 名の検証は PartyId の Deserialize に任せる
 */
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CredentialDigest, PolicyError};
use crate::claims::{Claim, ClaimSet};

/// How a credential is named in a policy file.
///
/// `{"token": "..."}` is convenient for test fixtures, `{"sha256": "..."}` keeps secrets out of the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialRef {
    Token(String),
    Sha256(String),
}

impl CredentialRef {
    pub fn digest(&self) -> Result<CredentialDigest, PolicyError> {
        match self {
            CredentialRef::Token(token) => Ok(CredentialDigest::of(token.as_bytes())),
            CredentialRef::Sha256(hex) => Ok(CredentialDigest::from_hex(hex)?),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantEntry {
    pub credential: CredentialRef,
    #[serde(default)]
    pub claims: Vec<Claim>,
    #[serde(default)]
    pub application_id: Option<String>,
    #[serde(default)]
    pub expiration: Option<DateTime<Utc>>,
    #[serde(default)]
    pub identity_provider: Option<String>,
}

impl GrantEntry {
    pub fn into_claim_set(self) -> ClaimSet {
        let mut set = ClaimSet::new(self.claims);
        if let Some(app) = self.application_id {
            set = set.with_application_id(app);
        }
        if let Some(exp) = self.expiration {
            set = set.with_expiration(exp);
        }
        if let Some(idp) = self.identity_provider {
            set = set.with_identity_provider(idp);
        }
        set
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyFile {
    #[serde(default)]
    pub wildcard: Vec<CredentialRef>,
    #[serde(default)]
    pub grants: Vec<GrantEntry>,
}

impl PolicyFile {
    pub fn from_json(s: &str) -> Result<Self, PolicyError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self, PolicyError> {
        let raw = std::fs::read_to_string(path).map_err(|source| PolicyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }
}
