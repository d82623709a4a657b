/*!
 * Claims resolver
 *
 * Responsibility:
 * - credential → ClaimSet の変換 (`ClaimsResolver`)
 * - 実装は config で選択する（wildcard / fixed / policy）
 *
 * Notes:
 * - decode は同期・副作用なし（ログも出さない）。reject のログは呼び出し側で出す
 * - 共有状態は immutable な設定のみなので lock は不要
 */

mod factory;
mod fixed;
mod policy;

use chrono::{DateTime, Utc};

use crate::claims::ClaimSet;
use crate::error::ResolveError;

pub use factory::build_resolver;
pub use fixed::{FixedGrantResolver, WildcardResolver};
pub use policy::{PolicyResolver, PolicyResolverOptions};

pub const DEFAULT_MAX_CREDENTIAL_LENGTH: usize = 4096;

pub trait ClaimsResolver: Send + Sync + std::fmt::Debug {
    /// Resolve a credential as of `now`.
    fn decode_at(
        &self,
        credential: Option<&[u8]>,
        now: DateTime<Utc>,
    ) -> Result<ClaimSet, ResolveError>;

    fn decode(&self, credential: Option<&[u8]>) -> Result<ClaimSet, ResolveError> {
        self.decode_at(credential, Utc::now())
    }
}

/// Presence + structural checks shared by every resolver.
///
/// - absent / empty / whitespace-only → `Unauthenticated`
/// - non UTF-8, too long, or outside the token alphabet → `InvalidCredential`
pub(crate) fn validate_credential(
    credential: Option<&[u8]>,
    max_len: usize,
) -> Result<&str, ResolveError> {
    let raw = credential.ok_or(ResolveError::Unauthenticated)?;
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Err(ResolveError::Unauthenticated);
    }
    if raw.len() > max_len {
        return Err(ResolveError::invalid(format!(
            "credential exceeds {} bytes",
            max_len
        )));
    }
    let s = std::str::from_utf8(raw)
        .map_err(|_| ResolveError::invalid("credential is not valid UTF-8"))?;
    if let Some(position) = s.bytes().position(|b| !is_token_byte(b)) {
        return Err(ResolveError::invalid(format!(
            "credential contains disallowed character at byte {}",
            position
        )));
    }
    Ok(s)
}

pub(crate) fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~' | b'+' | b'/' | b'=' | b':')
}
