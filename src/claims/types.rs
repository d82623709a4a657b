/*
 * Responsibility
 * - Claim / ClaimSet の型（契約）
 * - decode の結果として一度だけ組み立てられ、以降は不変
 *
 * Notes
 * - ここは「何が許可されているか」を表すだけ。どの操作を許すかの判定は enforcement 側
 * - is_admin / can_act_as などは enforcement が読むための view
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PartyId;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Claim {
    Admin,
    Public,
    ActAsAnyParty,
    ReadAsParty { party: PartyId },
    ActAsParty { party: PartyId },
}

/// Claims carried by the wildcard grant, in order.
pub const WILDCARD_CLAIMS: [Claim; 3] = [Claim::Admin, Claim::Public, Claim::ActAsAnyParty];

/// Result of decoding one credential.
///
/// - `claims` keeps insertion order (deterministic output, not an authorization input)
/// - an empty `claims` means "no authorization", never "everything"
/// - `expiration: None` means non-expiring, `identity_provider: None` means the default provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSet {
    claims: Vec<Claim>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    application_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expiration: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    identity_provider: Option<String>,
}

impl ClaimSet {
    pub fn new(claims: Vec<Claim>) -> Self {
        Self {
            claims,
            ..Self::default()
        }
    }

    /// Canonical unconditional grant.
    pub fn wildcard() -> Self {
        Self::new(WILDCARD_CLAIMS.to_vec())
    }

    /// Fixed identity for a single party: full rights plus explicit read/act for `party`.
    pub fn fixed_identity(party: PartyId) -> Self {
        let mut claims = WILDCARD_CLAIMS.to_vec();
        claims.push(Claim::ReadAsParty {
            party: party.clone(),
        });
        claims.push(Claim::ActAsParty { party });
        Self::new(claims)
    }

    pub fn with_application_id(mut self, application_id: impl Into<String>) -> Self {
        self.application_id = Some(application_id.into());
        self
    }

    pub fn with_expiration(mut self, expiration: DateTime<Utc>) -> Self {
        self.expiration = Some(expiration);
        self
    }

    pub fn with_identity_provider(mut self, identity_provider: impl Into<String>) -> Self {
        self.identity_provider = Some(identity_provider.into());
        self
    }

    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    pub fn application_id(&self) -> Option<&str> {
        self.application_id.as_deref()
    }

    pub fn expiration(&self) -> Option<DateTime<Utc>> {
        self.expiration
    }

    pub fn identity_provider(&self) -> Option<&str> {
        self.identity_provider.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    pub fn is_wildcard(&self) -> bool {
        *self == Self::wildcard()
    }

    pub fn is_admin(&self) -> bool {
        self.claims.contains(&Claim::Admin)
    }

    pub fn is_public(&self) -> bool {
        self.claims.contains(&Claim::Public)
    }

    pub fn can_act_as(&self, party: &PartyId) -> bool {
        self.claims.iter().any(|c| match c {
            Claim::ActAsAnyParty => true,
            Claim::ActAsParty { party: p } => p == party,
            _ => false,
        })
    }

    // act-as implies read-as
    pub fn can_read_as(&self, party: &PartyId) -> bool {
        self.can_act_as(party)
            || self
                .claims
                .iter()
                .any(|c| matches!(c, Claim::ReadAsParty { party: p } if p == party))
    }

    pub fn valid_for_application(&self, application_id: &str) -> bool {
        self.application_id
            .as_deref()
            .is_none_or(|id| id == application_id)
    }

    /// `true` once `now` has reached the expiration instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiration.is_some_and(|exp| exp <= now)
    }
}
