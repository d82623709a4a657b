/*!
 * Authorization claims
 *
 * Responsibility:
 * - 認可判定の材料となる Claim / ClaimSet の値型
 * - party 名のバリデーションは party に分離する
 *
 * Public API:
 * - Claim, ClaimSet, WILDCARD_CLAIMS
 * - PartyId, PartyIdError
 */

mod party;
mod types;

pub use party::{PartyId, PartyIdError};
pub use types::{Claim, ClaimSet, WILDCARD_CLAIMS};
