//! In-memory policy table.

use crate::{Amount, Error, Identity, Policy, PolicyId, Result};
use std::collections::HashMap;

/// Owns every policy record for the life of the process.
///
/// Constructed once by the host and handed by reference to
/// [`crate::AccessController`]. Records are never removed.
#[derive(Debug, Default)]
pub struct PolicyStore {
    policies: HashMap<PolicyId, Policy>,
    total_policies: u64,
}

impl PolicyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a policy owned by `owner`.
    ///
    /// An existing record under the same identifier is replaced wholesale,
    /// grants included. Every successful call counts towards [`Self::count`].
    pub fn create(
        &mut self,
        id: PolicyId,
        limit: Amount,
        paid: Amount,
        owner: Identity,
    ) -> Result<&Policy> {
        Self::validate(limit, paid)?;

        self.total_policies += 1;
        self.policies.insert(id, Policy::new(owner, limit, paid));
        self.get(id)
    }

    /// Check purchase arguments without touching the store.
    pub fn validate(limit: Amount, paid: Amount) -> Result<()> {
        if limit == 0 {
            return Err(Error::InvalidParameters("limit must be greater than zero".into()));
        }
        if paid == 0 {
            return Err(Error::InvalidParameters("payment must be greater than zero".into()));
        }
        Ok(())
    }

    /// Look up a policy.
    pub fn get(&self, id: PolicyId) -> Result<&Policy> {
        self.policies.get(&id).ok_or(Error::PolicyNotFound(id))
    }

    pub(crate) fn get_mut(&mut self, id: PolicyId) -> Result<&mut Policy> {
        self.policies.get_mut(&id).ok_or(Error::PolicyNotFound(id))
    }

    /// Total successful purchases, re-purchases included.
    pub fn count(&self) -> u64 {
        self.total_policies
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_increments_count() {
        let mut store = PolicyStore::new();
        store.create(PolicyId(1), 1000, 500, Identity::new("o")).unwrap();
        assert_eq!(store.count(), 1);
        store.create(PolicyId(2), 1, 1, Identity::new("o")).unwrap();
        assert_eq!(store.count(), 2);
    }

    #[test]
    fn test_invalid_parameters_leave_store_untouched() {
        let mut store = PolicyStore::new();

        let err = store.create(PolicyId(1), 0, 500, Identity::new("o")).unwrap_err();
        assert!(matches!(err, Error::InvalidParameters(_)));
        let err = store.create(PolicyId(1), 1000, 0, Identity::new("o")).unwrap_err();
        assert!(matches!(err, Error::InvalidParameters(_)));

        assert_eq!(store.count(), 0);
        assert!(store.get(PolicyId(1)).is_err());
    }

    #[test]
    fn test_get_missing() {
        let store = PolicyStore::new();
        assert!(matches!(
            store.get(PolicyId(9)),
            Err(Error::PolicyNotFound(PolicyId(9)))
        ));
    }

    #[test]
    fn test_repurchase_overwrites_record() {
        let mut store = PolicyStore::new();
        store.create(PolicyId(123), 1000, 500, Identity::new("a")).unwrap();
        store
            .get_mut(PolicyId(123))
            .unwrap()
            .set_grant(Identity::new("b"), crate::FieldTag::Limit);

        let policy = store.create(PolicyId(123), 2000, 700, Identity::new("c")).unwrap();
        assert_eq!(policy.owner(), &Identity::new("c"));
        assert_eq!(policy.limit(), 2000);
        assert_eq!(policy.premium(), 700);
        assert_eq!(policy.grantee_count(), 0);
        assert_eq!(store.count(), 2);
    }
}
