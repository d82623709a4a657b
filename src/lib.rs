/*
 * Responsibility
 * - credential (opaque bytes) → ClaimSet への変換を提供する crate root
 * - transport からの抽出・enforcement は呼び出し側の責務（ここには置かない）
 * - 公開 API の re-export
 */
pub mod claims;
pub mod config;
pub mod error;
pub mod services;
pub mod telemetry;

pub use claims::{Claim, ClaimSet, PartyId, PartyIdError, WILDCARD_CLAIMS};
pub use config::{AppEnv, Config, ConfigError, ResolverKind};
pub use error::ResolveError;
pub use services::resolver::{
    ClaimsResolver, FixedGrantResolver, PolicyResolver, WildcardResolver, build_resolver,
};
