//! Record identifiers.
//!
//! Every stored record is addressed by a 128-bit identifier rendered as a
//! fixed-length 32-character hex string. [`RecordId::parse`] accepts exactly
//! that encoding — hyphenated UUID forms and anything of the wrong length
//! are rejected — so the codec stays a strict inverse of `Display`.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::{Error, Result};

/// Length of the canonical hex encoding.
pub const ENCODED_LEN: usize = 32;

/// An opaque record identifier, unique per record and generated at
/// creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(Uuid);

impl RecordId {
  /// Generate a fresh random identifier.
  pub fn generate() -> Self { Self(Uuid::new_v4()) }

  /// Parse the canonical 32-char hex encoding. Uppercase hex is accepted;
  /// output is always lowercase.
  pub fn parse(raw: &str) -> Result<Self> {
    if raw.len() != ENCODED_LEN || !raw.bytes().all(|b| b.is_ascii_hexdigit())
    {
      return Err(Error::InvalidIdentifier(raw.to_owned()));
    }
    Uuid::try_parse(raw)
      .map(Self)
      .map_err(|_| Error::InvalidIdentifier(raw.to_owned()))
  }
}

impl fmt::Display for RecordId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0.simple())
  }
}

impl FromStr for RecordId {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::parse(s) }
}

impl Serialize for RecordId {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&self.0.simple())
  }
}

impl<'de> Deserialize<'de> for RecordId {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Self::parse(&raw).map_err(serde::de::Error::custom)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn display_round_trips_through_parse() {
    let id = RecordId::generate();
    let encoded = id.to_string();
    assert_eq!(encoded.len(), ENCODED_LEN);
    assert_eq!(RecordId::parse(&encoded).unwrap(), id);
  }

  #[test]
  fn uppercase_hex_is_accepted() {
    let id = RecordId::generate();
    let upper = id.to_string().to_uppercase();
    assert_eq!(RecordId::parse(&upper).unwrap(), id);
  }

  #[test]
  fn hyphenated_form_is_rejected() {
    let hyphenated = Uuid::new_v4().hyphenated().to_string();
    assert!(matches!(
      RecordId::parse(&hyphenated),
      Err(Error::InvalidIdentifier(_))
    ));
  }

  #[test]
  fn wrong_length_and_non_hex_are_rejected() {
    assert!(RecordId::parse("abc123").is_err());
    assert!(RecordId::parse(&"0".repeat(33)).is_err());
    assert!(RecordId::parse(&"g".repeat(32)).is_err());
    assert!(RecordId::parse("").is_err());
  }

  #[test]
  fn serde_uses_the_hex_encoding() {
    let id = RecordId::generate();
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, format!("{:?}", id.to_string()));
    let back: RecordId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
  }
}
