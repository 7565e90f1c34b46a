//! The policy record.

use crate::{Amount, FieldTag, Identity};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One insurance contract.
///
/// `owner`, `limit` and `premium` are fixed at purchase. Only the grant
/// table changes afterwards, and only through [`crate::AccessController`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    owner: Identity,
    limit: Amount,
    premium: Amount,
    /// One tag per grantee; absence means no grant.
    #[serde(default)]
    grants: HashMap<Identity, FieldTag>,
}

impl Policy {
    pub(crate) fn new(owner: Identity, limit: Amount, premium: Amount) -> Self {
        Self {
            owner,
            limit,
            premium,
            grants: HashMap::new(),
        }
    }

    pub fn owner(&self) -> &Identity {
        &self.owner
    }

    pub fn limit(&self) -> Amount {
        self.limit
    }

    pub fn premium(&self) -> Amount {
        self.premium
    }

    /// The stored value behind a field tag.
    pub fn field(&self, field: FieldTag) -> Amount {
        match field {
            FieldTag::Limit => self.limit,
            FieldTag::Premium => self.premium,
        }
    }

    /// The single field `grantee` may read, if any.
    pub fn grant_for(&self, grantee: &Identity) -> Option<FieldTag> {
        self.grants.get(grantee).copied()
    }

    /// Number of identities holding a grant.
    pub fn grantee_count(&self) -> usize {
        self.grants.len()
    }

    /// Replaces whatever `grantee` held before. Returns the previous tag.
    pub(crate) fn set_grant(&mut self, grantee: Identity, field: FieldTag) -> Option<FieldTag> {
        self.grants.insert(grantee, field)
    }
}
