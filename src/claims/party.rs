use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const MAX_PARTY_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PartyIdError {
    #[error("party name is empty")]
    Empty,
    #[error("party name exceeds {} bytes", MAX_PARTY_LEN)]
    TooLong,
    #[error("party name contains disallowed character at byte {position}")]
    InvalidChar { position: usize },
}

/// Name of a principal on whose behalf actions are authorized.
///
/// - ASCII alphanumerics plus `:`, `-`, `_`
/// - 1..=255 bytes
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PartyId(String);

impl PartyId {
    pub fn parse(s: &str) -> Result<Self, PartyIdError> {
        Self::validate(s)?;
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(s: &str) -> Result<(), PartyIdError> {
        if s.is_empty() {
            return Err(PartyIdError::Empty);
        }
        if s.len() > MAX_PARTY_LEN {
            return Err(PartyIdError::TooLong);
        }
        // position だけを返し、文字そのものはエラーに載せない
        match s.bytes().position(|b| !is_party_byte(b)) {
            Some(position) => Err(PartyIdError::InvalidChar { position }),
            None => Ok(()),
        }
    }
}

fn is_party_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b':' | b'-' | b'_')
}

impl TryFrom<String> for PartyId {
    type Error = PartyIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::validate(&s)?;
        Ok(Self(s))
    }
}

impl From<PartyId> for String {
    fn from(p: PartyId) -> Self {
        p.0
    }
}

impl fmt::Display for PartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
