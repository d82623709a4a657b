/*
 * Responsibility
 * - decode の失敗を表す ResolveError 定義
 * - enforcement 側が reject に変換するための安定した code を提供する
 *
 * Notes
 * - message に credential そのものを載せない（ログ経由の漏洩を防ぐ）
 */
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("no credential presented")]
    Unauthenticated,
    #[error("invalid credential: {reason}")]
    InvalidCredential { reason: String },
    #[error("credential expired at {expired_at}")]
    ExpiredCredential { expired_at: DateTime<Utc> },
}

impl ResolveError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidCredential {
            reason: reason.into(),
        }
    }

    pub fn expired(expired_at: DateTime<Utc>) -> Self {
        Self::ExpiredCredential { expired_at }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ResolveError::Unauthenticated => "UNAUTHENTICATED",
            ResolveError::InvalidCredential { .. } => "INVALID_CREDENTIAL",
            ResolveError::ExpiredCredential { .. } => "EXPIRED_CREDENTIAL",
        }
    }
}
