/*
 * Responsibility
 * - unsigned claims payload (`claims:` + base64url(JSON)) の encode / decode
 * - 署名検証は行わない。production では既定で無効（config 参照）
 */
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::claims::{Claim, ClaimSet, PartyId};
use crate::error::ResolveError;

pub const PAYLOAD_PREFIX: &str = "claims:";

/// Claims payload carried inside a `claims:` credential.
///
/// Every field is optional; an empty object yields an empty ClaimSet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedPayload {
    #[serde(default, skip_serializing_if = "is_false")]
    pub admin: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub public: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub act_as_any_party: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub read_as: Vec<PartyId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub act_as: Vec<PartyId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_provider: Option<String>,
    /// unix seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl UnsignedPayload {
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_vec(self)?;
        Ok(format!("{}{}", PAYLOAD_PREFIX, URL_SAFE_NO_PAD.encode(json)))
    }

    /// Decode the part after the prefix. `credential` must already start with [`PAYLOAD_PREFIX`].
    pub fn decode(credential: &str) -> Result<Self, ResolveError> {
        let encoded = credential
            .strip_prefix(PAYLOAD_PREFIX)
            .ok_or_else(|| ResolveError::invalid("missing claims payload prefix"))?;

        let json = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|_| ResolveError::invalid("claims payload is not base64url"))?;

        // serde の message は入力値を含むことがあるので位置だけ返す
        serde_json::from_slice(&json).map_err(|e| {
            ResolveError::invalid(format!(
                "claims payload rejected ({:?} error at line {} column {})",
                e.classify(),
                e.line(),
                e.column()
            ))
        })
    }

    pub fn expiration(&self) -> Result<Option<DateTime<Utc>>, ResolveError> {
        self.exp
            .map(|secs| {
                DateTime::from_timestamp(secs, 0)
                    .ok_or_else(|| ResolveError::invalid("claims payload 'exp' out of range"))
            })
            .transpose()
    }

    /// Admin, Public, ActAsAnyParty, then read_as, then act_as.
    pub fn into_claim_set(self) -> Result<ClaimSet, ResolveError> {
        let expiration = self.expiration()?;

        let mut claims = Vec::with_capacity(3 + self.read_as.len() + self.act_as.len());
        if self.admin {
            claims.push(Claim::Admin);
        }
        if self.public {
            claims.push(Claim::Public);
        }
        if self.act_as_any_party {
            claims.push(Claim::ActAsAnyParty);
        }
        claims.extend(
            self.read_as
                .into_iter()
                .map(|party| Claim::ReadAsParty { party }),
        );
        claims.extend(self.act_as.into_iter().map(|party| Claim::ActAsParty { party }));

        let mut set = ClaimSet::new(claims);
        if let Some(app) = self.application_id {
            set = set.with_application_id(app);
        }
        if let Some(exp) = expiration {
            set = set.with_expiration(exp);
        }
        if let Some(idp) = self.identity_provider {
            set = set.with_identity_provider(idp);
        }
        Ok(set)
    }
}
