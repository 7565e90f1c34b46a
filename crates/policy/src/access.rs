//! Grant issuance and read enforcement.

use crate::{
    AccessConfig, Amount, Error, FieldTag, GrantAuthority, Identity, Notification, Notifier,
    Policy, PolicyId, PolicyStore, Result,
};

/// Result of checking a read against a policy's grant table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Enforces field-level read grants on the records of a [`PolicyStore`].
///
/// Each grantee holds at most one field per policy. Granting again replaces
/// the earlier field; there is no way back to "no grant" short of the whole
/// policy being re-purchased.
#[derive(Debug, Clone, Default)]
pub struct AccessController {
    config: AccessConfig,
}

impl AccessController {
    pub fn new(config: AccessConfig) -> Self {
        Self { config }
    }

    /// Check whether `caller` may read `field` of `policy`.
    ///
    /// No grant and a grant for the other field look the same from here.
    pub fn check(&self, policy: &Policy, caller: &Identity, field: FieldTag) -> Decision {
        match policy.grant_for(caller) {
            Some(granted) if granted == field => Decision::Allow,
            _ => Decision::Deny,
        }
    }

    /// Let `grantee` read `field` of policy `id`, replacing any earlier grant.
    ///
    /// The grant is notified before it is stored; if the notifier refuses,
    /// the grant table is left as it was.
    pub fn grant(
        &self,
        store: &mut PolicyStore,
        notifier: &mut dyn Notifier,
        id: PolicyId,
        caller: &Identity,
        grantee: Identity,
        field: FieldTag,
    ) -> Result<()> {
        if grantee.is_null() {
            return Err(Error::InvalidGrantee);
        }

        let policy = store.get_mut(id)?;
        if self.config.grant_authority == GrantAuthority::Owner && policy.owner() != caller {
            return Err(Error::NotOwner {
                policy: id,
                caller: caller.clone(),
            });
        }

        notifier.notify(Notification::AccessGranted {
            policy: id,
            grantor: caller.clone(),
            grantee: grantee.clone(),
            field,
        })?;
        policy.set_grant(grantee, field);
        Ok(())
    }

    pub fn grant_limit(
        &self,
        store: &mut PolicyStore,
        notifier: &mut dyn Notifier,
        id: PolicyId,
        caller: &Identity,
        grantee: Identity,
    ) -> Result<()> {
        self.grant(store, notifier, id, caller, grantee, FieldTag::Limit)
    }

    pub fn grant_premium(
        &self,
        store: &mut PolicyStore,
        notifier: &mut dyn Notifier,
        id: PolicyId,
        caller: &Identity,
        grantee: Identity,
    ) -> Result<()> {
        self.grant(store, notifier, id, caller, grantee, FieldTag::Premium)
    }

    /// Read `field` of policy `id` on behalf of `caller`.
    ///
    /// A rejected read notifies `AccessDenied` exactly once before failing.
    /// If that notification cannot be delivered, the delivery error is
    /// returned instead.
    pub fn read(
        &self,
        store: &PolicyStore,
        notifier: &mut dyn Notifier,
        id: PolicyId,
        field: FieldTag,
        caller: &Identity,
    ) -> Result<Amount> {
        let policy = store.get(id)?;

        match self.check(policy, caller, field) {
            Decision::Allow => Ok(policy.field(field)),
            Decision::Deny => {
                notifier.notify(Notification::AccessDenied {
                    policy: id,
                    caller: caller.clone(),
                    field,
                })?;
                Err(Error::AccessDenied {
                    caller: caller.clone(),
                    field,
                })
            }
        }
    }

    pub fn read_limit(
        &self,
        store: &PolicyStore,
        notifier: &mut dyn Notifier,
        id: PolicyId,
        caller: &Identity,
    ) -> Result<Amount> {
        self.read(store, notifier, id, FieldTag::Limit, caller)
    }

    pub fn read_premium(
        &self,
        store: &PolicyStore,
        notifier: &mut dyn Notifier,
        id: PolicyId,
        caller: &Identity,
    ) -> Result<Amount> {
        self.read(store, notifier, id, FieldTag::Premium, caller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P: PolicyId = PolicyId(123);

    fn id(s: &str) -> Identity {
        Identity::new(s)
    }

    fn setup() -> (PolicyStore, AccessController, Vec<Notification>) {
        let mut store = PolicyStore::new();
        store.create(P, 1000, 500, id("owner")).unwrap();
        (store, AccessController::default(), Vec::new())
    }

    #[test]
    fn test_scenario_limit_grant() {
        let (mut store, access, mut events) = setup();

        access
            .grant_limit(&mut store, &mut events, P, &id("owner"), id("bob"))
            .unwrap();

        assert_eq!(access.read_limit(&store, &mut events, P, &id("bob")).unwrap(), 1000);

        let err = access
            .read_premium(&store, &mut events, P, &id("bob"))
            .unwrap_err();
        assert!(matches!(err, Error::AccessDenied { field: FieldTag::Premium, .. }));

        let err = access
            .read_limit(&store, &mut events, P, &id("carol"))
            .unwrap_err();
        assert!(matches!(err, Error::AccessDenied { field: FieldTag::Limit, .. }));
    }

    #[test]
    fn test_regrant_overwrites() {
        let (mut store, access, mut events) = setup();

        access
            .grant_premium(&mut store, &mut events, P, &id("owner"), id("bob"))
            .unwrap();
        assert_eq!(access.read_premium(&store, &mut events, P, &id("bob")).unwrap(), 500);

        access
            .grant_limit(&mut store, &mut events, P, &id("owner"), id("bob"))
            .unwrap();
        assert!(access.read_premium(&store, &mut events, P, &id("bob")).is_err());
        assert_eq!(access.read_limit(&store, &mut events, P, &id("bob")).unwrap(), 1000);
    }

    #[test]
    fn test_regrant_same_field_is_idempotent() {
        let (mut store, access, mut events) = setup();
        for _ in 0..2 {
            access
                .grant_limit(&mut store, &mut events, P, &id("owner"), id("bob"))
                .unwrap();
        }
        assert_eq!(store.get(P).unwrap().grantee_count(), 1);
        assert_eq!(access.read_limit(&store, &mut events, P, &id("bob")).unwrap(), 1000);
    }

    #[test]
    fn test_denial_notifies_once() {
        let (store, access, mut events) = setup();

        let _ = access.read_premium(&store, &mut events, P, &id("mallory"));

        assert_eq!(
            events,
            vec![Notification::AccessDenied {
                policy: P,
                caller: id("mallory"),
                field: FieldTag::Premium,
            }]
        );
    }

    #[test]
    fn test_allowed_read_is_silent() {
        let (mut store, access, mut events) = setup();
        access
            .grant_limit(&mut store, &mut events, P, &id("owner"), id("bob"))
            .unwrap();
        events.clear();

        access.read_limit(&store, &mut events, P, &id("bob")).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_missing_policy() {
        let (mut store, access, mut events) = setup();
        let missing = PolicyId(7);

        for caller in ["owner", "bob", ""] {
            let err = access
                .read_limit(&store, &mut events, missing, &id(caller))
                .unwrap_err();
            assert!(matches!(err, Error::PolicyNotFound(PolicyId(7))));
        }
        let err = access
            .grant_premium(&mut store, &mut events, missing, &id("owner"), id("bob"))
            .unwrap_err();
        assert!(matches!(err, Error::PolicyNotFound(_)));
        assert!(events.is_empty());
    }

    #[test]
    fn test_null_grantee_rejected() {
        let (mut store, access, mut events) = setup();

        for grantee in ["", "0x0000000000000000000000000000000000000000"] {
            let err = access
                .grant_limit(&mut store, &mut events, P, &id("owner"), id(grantee))
                .unwrap_err();
            assert!(matches!(err, Error::InvalidGrantee));
        }
        assert_eq!(store.get(P).unwrap().grantee_count(), 0);
    }

    #[test]
    fn test_anyone_may_grant_by_default() {
        let (mut store, access, mut events) = setup();

        access
            .grant_premium(&mut store, &mut events, P, &id("stranger"), id("bob"))
            .unwrap();
        assert_eq!(access.read_premium(&store, &mut events, P, &id("bob")).unwrap(), 500);
    }

    #[test]
    fn test_owner_only_mode() {
        let (mut store, _, mut events) = setup();
        let access = AccessController::new(AccessConfig::owner_only());

        let err = access
            .grant_limit(&mut store, &mut events, P, &id("stranger"), id("bob"))
            .unwrap_err();
        assert!(matches!(err, Error::NotOwner { .. }));
        assert_eq!(store.get(P).unwrap().grantee_count(), 0);
        assert!(events.is_empty());

        access
            .grant_limit(&mut store, &mut events, P, &id("owner"), id("bob"))
            .unwrap();
        assert_eq!(access.read_limit(&store, &mut events, P, &id("bob")).unwrap(), 1000);
    }

    #[test]
    fn test_check_decisions() {
        let (mut store, access, mut events) = setup();
        access
            .grant_premium(&mut store, &mut events, P, &id("owner"), id("bob"))
            .unwrap();
        let policy = store.get(P).unwrap();

        assert!(access.check(policy, &id("bob"), FieldTag::Premium).is_allowed());
        assert_eq!(access.check(policy, &id("bob"), FieldTag::Limit), Decision::Deny);
        assert_eq!(access.check(policy, &id("carol"), FieldTag::Limit), Decision::Deny);
    }

    struct Refuse;

    impl Notifier for Refuse {
        fn notify(&mut self, _notification: Notification) -> Result<()> {
            Err(Error::Undelivered("audit offline".into()))
        }
    }

    #[test]
    fn test_undelivered_grant_changes_nothing() {
        let (mut store, access, mut events) = setup();
        access
            .grant_premium(&mut store, &mut events, P, &id("owner"), id("bob"))
            .unwrap();

        let err = access
            .grant_limit(&mut store, &mut Refuse, P, &id("owner"), id("bob"))
            .unwrap_err();
        assert!(matches!(err, Error::Undelivered(_)));
        assert_eq!(store.get(P).unwrap().grant_for(&id("bob")), Some(FieldTag::Premium));

        let err = access
            .grant_limit(&mut store, &mut Refuse, P, &id("owner"), id("carol"))
            .unwrap_err();
        assert!(matches!(err, Error::Undelivered(_)));
        assert_eq!(store.get(P).unwrap().grant_for(&id("carol")), None);
    }

    #[test]
    fn test_undelivered_denial_is_reported() {
        let (store, access, _) = setup();
        let err = access
            .read_limit(&store, &mut Refuse, P, &id("carol"))
            .unwrap_err();
        assert!(matches!(err, Error::Undelivered(_)));
    }

    #[test]
    fn test_owner_has_no_implicit_grant() {
        let (store, access, mut events) = setup();
        assert!(access.read_limit(&store, &mut events, P, &id("owner")).is_err());
    }

    #[test]
    fn test_repurchase_clears_grants() {
        let (mut store, access, mut events) = setup();
        access
            .grant_limit(&mut store, &mut events, P, &id("owner"), id("bob"))
            .unwrap();

        store.create(P, 1000, 500, id("owner")).unwrap();

        let err = access.read_limit(&store, &mut events, P, &id("bob")).unwrap_err();
        assert!(matches!(err, Error::AccessDenied { .. }));
    }
}
