//! Parsing of externally supplied record identifiers.
//!
//! Identifiers arrive as strings from token claims and request
//! payloads. Lookups consume a [`ParsedId`] and treat
//! [`ParsedId::Malformed`] as "not found" instead of failing the caller.

use uuid::Uuid;

/// Result of parsing an identifier string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedId {
    Valid(Uuid),
    Malformed,
}

impl ParsedId {
    pub fn parse(raw: &str) -> Self {
        match Uuid::parse_str(raw.trim()) {
            Ok(id) => Self::Valid(id),
            Err(_) => Self::Malformed,
        }
    }

    pub fn valid(self) -> Option<Uuid> {
        match self {
            Self::Valid(id) => Some(id),
            Self::Malformed => None,
        }
    }
}
