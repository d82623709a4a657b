use chrono::{DateTime, Utc};

use super::{ClaimsResolver, DEFAULT_MAX_CREDENTIAL_LENGTH, validate_credential};
use crate::claims::{ClaimSet, PartyId};
use crate::error::ResolveError;

/// Grants the wildcard to any well-formed credential. Test/bootstrap only.
#[derive(Debug, Clone)]
pub struct WildcardResolver {
    max_credential_length: usize,
}

impl WildcardResolver {
    pub fn new() -> Self {
        Self {
            max_credential_length: DEFAULT_MAX_CREDENTIAL_LENGTH,
        }
    }

    pub fn with_max_credential_length(mut self, max: usize) -> Self {
        self.max_credential_length = max;
        self
    }
}

impl Default for WildcardResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimsResolver for WildcardResolver {
    fn decode_at(
        &self,
        credential: Option<&[u8]>,
        _now: DateTime<Utc>,
    ) -> Result<ClaimSet, ResolveError> {
        validate_credential(credential, self.max_credential_length)?;
        Ok(ClaimSet::wildcard())
    }
}

/// Returns one configured ClaimSet for any well-formed credential.
#[derive(Debug, Clone)]
pub struct FixedGrantResolver {
    grant: ClaimSet,
    max_credential_length: usize,
}

impl FixedGrantResolver {
    pub fn new(grant: ClaimSet) -> Self {
        Self {
            grant,
            max_credential_length: DEFAULT_MAX_CREDENTIAL_LENGTH,
        }
    }

    /// The five-claim identity for `party`.
    pub fn for_party(party: PartyId) -> Self {
        Self::new(ClaimSet::fixed_identity(party))
    }

    pub fn with_max_credential_length(mut self, max: usize) -> Self {
        self.max_credential_length = max;
        self
    }

    pub fn grant(&self) -> &ClaimSet {
        &self.grant
    }
}

impl ClaimsResolver for FixedGrantResolver {
    fn decode_at(
        &self,
        credential: Option<&[u8]>,
        now: DateTime<Utc>,
    ) -> Result<ClaimSet, ResolveError> {
        validate_credential(credential, self.max_credential_length)?;
        match self.grant.expiration() {
            Some(exp) if self.grant.is_expired_at(now) => Err(ResolveError::expired(exp)),
            _ => Ok(self.grant.clone()),
        }
    }
}
