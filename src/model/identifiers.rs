//! Core identifier newtypes with smart constructors.
//!
//! Identifiers validate at construction time. Raw constructors are never
//! exported - use smart constructors only.

use std::fmt;

/// Unique identifier of a pack listing: the digit string captured from an
/// `ID : <digits>` line.
///
/// Guaranteed non-empty and ASCII digits only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct PackId(String);

impl PackId {
    /// Smart constructor: validates a non-empty, digits-only string.
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidPackId> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(InvalidPackId::Empty);
        }
        if !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidPackId::NonDigit(raw));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidPackId {
    #[error("Pack ID cannot be empty")]
    Empty,

    #[error("Pack ID must contain only digits, got {0:?}")]
    NonDigit(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_id_accepts_digit_string() {
        let id = PackId::new("1234");
        assert!(id.is_ok(), "Digit string should be accepted");
    }

    #[test]
    fn pack_id_rejects_empty_string() {
        assert!(
            matches!(PackId::new(""), Err(InvalidPackId::Empty)),
            "Empty string should return InvalidPackId::Empty"
        );
    }

    #[test]
    fn pack_id_rejects_non_digits() {
        assert!(
            matches!(PackId::new("12a4"), Err(InvalidPackId::NonDigit(_))),
            "Mixed alphanumeric should return InvalidPackId::NonDigit"
        );
    }

    #[test]
    fn pack_id_rejects_negative_number() {
        assert!(PackId::new("-5").is_err(), "Sign characters are not digits");
    }

    #[test]
    fn pack_id_as_str_returns_original() {
        let id = PackId::new("42").expect("valid id");
        assert_eq!(id.as_str(), "42");
    }

    #[test]
    fn pack_id_display_returns_inner_string() {
        let id = PackId::new("007").expect("valid id");
        assert_eq!(id.to_string(), "007", "Leading zeros must be preserved");
    }

    #[test]
    fn pack_id_serializes_as_plain_string() {
        let id = PackId::new("55").expect("valid id");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"55\"");
    }
}
