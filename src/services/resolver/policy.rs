use chrono::{DateTime, Duration, Utc};

use super::{ClaimsResolver, DEFAULT_MAX_CREDENTIAL_LENGTH, validate_credential};
use crate::claims::{ClaimSet, PartyId};
use crate::error::ResolveError;
use crate::services::payload::{PAYLOAD_PREFIX, UnsignedPayload};
use crate::services::policy::{CredentialDigest, Policy};

/// Knobs for [`PolicyResolver`] that are not part of the policy table itself.
#[derive(Debug, Clone)]
pub struct PolicyResolverOptions {
    /// `Some("-token")` maps `P-token` to the fixed identity of `P`. `None` disables.
    pub party_token_suffix: Option<String>,
    pub accept_unsigned_payloads: bool,
    pub expiry_leeway: Duration,
    pub max_credential_length: usize,
}

impl Default for PolicyResolverOptions {
    fn default() -> Self {
        Self {
            party_token_suffix: None,
            accept_unsigned_payloads: false,
            expiry_leeway: Duration::seconds(60),
            max_credential_length: DEFAULT_MAX_CREDENTIAL_LENGTH,
        }
    }
}

/// Policy-driven resolver.
///
/// Resolution order:
/// 1. presence and structure
/// 2. wildcard table (by digest)
/// 3. static grants (by digest), with expiration
/// 4. `claims:` unsigned payloads, when enabled
/// 5. `<party><suffix>` fixed identities, when enabled
///
/// Anything else is `InvalidCredential`.
#[derive(Debug, Clone)]
pub struct PolicyResolver {
    policy: Policy,
    options: PolicyResolverOptions,
}

impl PolicyResolver {
    pub fn new(policy: Policy, options: PolicyResolverOptions) -> Self {
        Self { policy, options }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn options(&self) -> &PolicyResolverOptions {
        &self.options
    }

    fn check_expiration(&self, set: ClaimSet, now: DateTime<Utc>) -> Result<ClaimSet, ResolveError> {
        // underflow はどの exp よりも前なので「期限内」扱い
        let cutoff = now.checked_sub_signed(self.options.expiry_leeway);
        match (set.expiration(), cutoff) {
            (Some(exp), Some(cutoff)) if set.is_expired_at(cutoff) => {
                Err(ResolveError::expired(exp))
            }
            _ => Ok(set),
        }
    }

    fn party_token(&self, credential: &str) -> Option<Result<ClaimSet, ResolveError>> {
        let suffix = self.options.party_token_suffix.as_deref()?;
        let name = credential.strip_suffix(suffix)?;
        Some(
            PartyId::parse(name)
                .map(ClaimSet::fixed_identity)
                .map_err(|e| ResolveError::invalid(format!("party token: {}", e))),
        )
    }
}

impl ClaimsResolver for PolicyResolver {
    fn decode_at(
        &self,
        credential: Option<&[u8]>,
        now: DateTime<Utc>,
    ) -> Result<ClaimSet, ResolveError> {
        let credential = validate_credential(credential, self.options.max_credential_length)?;

        let digest = CredentialDigest::of(credential.as_bytes());
        if self.policy.is_wildcard(&digest) {
            return Ok(ClaimSet::wildcard());
        }
        if let Some(grant) = self.policy.grant(&digest) {
            return self.check_expiration(grant.clone(), now);
        }

        if self.options.accept_unsigned_payloads && credential.starts_with(PAYLOAD_PREFIX) {
            let set = UnsignedPayload::decode(credential)?.into_claim_set()?;
            return self.check_expiration(set, now);
        }

        if let Some(result) = self.party_token(credential) {
            return result;
        }

        Err(ResolveError::invalid("unrecognized credential"))
    }
}
