use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Opaque monetary value. Stored and returned, never interpreted.
pub type Amount = u64;

/// The readable fields of a policy that can be granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldTag {
    Limit,
    Premium,
}

impl FieldTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldTag::Limit => "limit",
            FieldTag::Premium => "premium",
        }
    }
}

impl fmt::Display for FieldTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "limit" => Ok(FieldTag::Limit),
            "premium" => Ok(FieldTag::Premium),
            _ => Err(Error::Parse(format!("unknown field '{s}' (expected limit or premium)"))),
        }
    }
}

/// Externally supplied policy number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyId(pub u64);

impl fmt::Display for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PolicyId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse()
            .map(PolicyId)
            .map_err(|e| Error::Parse(format!("invalid policy id '{s}': {e}")))
    }
}

impl From<u64> for PolicyId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// An authenticated caller, as vouched for by the host environment.
///
/// The value is opaque: it is compared for equality and printed, nothing
/// more. The empty string and the all-zero address (`0x000...`) are the
/// null identity and can never receive a grant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_null(&self) -> bool {
        let digits = self
            .0
            .strip_prefix("0x")
            .or_else(|| self.0.strip_prefix("0X"))
            .unwrap_or(&self.0);
        digits.chars().all(|c| c == '0')
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for Identity {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_identities() {
        assert!(Identity::new("").is_null());
        assert!(Identity::new("0x").is_null());
        assert!(Identity::new("0x0000000000000000000000000000000000000000").is_null());
        assert!(Identity::new("000").is_null());
        assert!(!Identity::new("0x00a0").is_null());
        assert!(!Identity::new("alice").is_null());
    }

    #[test]
    fn test_field_tag_parse() {
        assert_eq!("limit".parse::<FieldTag>().unwrap(), FieldTag::Limit);
        assert_eq!("PREMIUM".parse::<FieldTag>().unwrap(), FieldTag::Premium);
        assert!("owner".parse::<FieldTag>().is_err());
    }

    #[test]
    fn test_field_tag_serde() {
        let json = serde_json::to_string(&FieldTag::Premium).unwrap();
        assert_eq!(json, "\"premium\"");
        let id: Identity = serde_json::from_str("\"bob\"").unwrap();
        assert_eq!(id, Identity::new("bob"));
    }
}
