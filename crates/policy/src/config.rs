//! Access configuration loaded from TOML.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Who may issue grants on a policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantAuthority {
    /// Any caller may grant on any existing policy.
    #[default]
    Anyone,
    /// Only the policy owner may grant.
    Owner,
}

/// Settings for [`crate::AccessController`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessConfig {
    #[serde(default)]
    pub grant_authority: GrantAuthority,
}

impl AccessConfig {
    /// Parse access settings from a TOML string.
    pub fn parse(toml: &str) -> Result<Self> {
        toml::from_str(toml).map_err(|e| Error::Parse(e.to_string()))
    }

    /// Grants restricted to the policy owner.
    pub fn owner_only() -> Self {
        Self {
            grant_authority: GrantAuthority::Owner,
        }
    }
}
