//! The caller-facing policy service.

use crate::Result;
use policy::{
    AccessConfig, AccessController, Amount, FieldTag, Identity, Notification, Notifier, PolicyId,
    PolicyStore,
};
use storage::{Event, EventStore};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Hosts one [`PolicyStore`] and serializes every request against it.
///
/// Each operation holds the lock from validation through the audit write.
/// The audit entry is written before the in-memory change, so a request
/// whose audit write fails has no effect. Share it
/// across tasks with `Arc<Service>`.
pub struct Service {
    inner: Mutex<Inner>,
}

struct Inner {
    policies: PolicyStore,
    access: AccessController,
    audit: EventStore,
}

impl Service {
    /// Create a service with an empty policy table.
    pub fn new(audit: EventStore, config: AccessConfig) -> Self {
        Self {
            inner: Mutex::new(Inner {
                policies: PolicyStore::new(),
                access: AccessController::new(config),
                audit,
            }),
        }
    }

    /// Buy (or re-buy) policy `id` for `caller`, paying `payment` as premium.
    pub async fn purchase_policy(
        &self,
        caller: &Identity,
        id: PolicyId,
        limit: Amount,
        payment: Amount,
    ) -> Result<()> {
        PolicyStore::validate(limit, payment)?;

        let mut inner = self.inner.lock().await;
        let notification = Notification::PolicyPurchased {
            policy: id,
            owner: caller.clone(),
            limit,
            premium: payment,
        };
        inner.audit.append(&Event::from(notification))?;
        inner.policies.create(id, limit, payment, caller.clone())?;

        info!(policy = %id, owner = %caller, limit, premium = payment, "policy purchased");
        Ok(())
    }

    /// Let `grantee` read the coverage limit of policy `id`.
    pub async fn grant_access_to_limit(
        &self,
        caller: &Identity,
        id: PolicyId,
        grantee: Identity,
    ) -> Result<()> {
        self.grant(caller, id, grantee, FieldTag::Limit).await
    }

    /// Let `grantee` read the premium of policy `id`.
    pub async fn grant_access_to_premium(
        &self,
        caller: &Identity,
        id: PolicyId,
        grantee: Identity,
    ) -> Result<()> {
        self.grant(caller, id, grantee, FieldTag::Premium).await
    }

    /// Read the coverage limit of policy `id` as `caller`.
    pub async fn access_policy_limit(&self, caller: &Identity, id: PolicyId) -> Result<Amount> {
        self.read(caller, id, FieldTag::Limit).await
    }

    /// Read the premium of policy `id` as `caller`.
    pub async fn access_policy_premium(&self, caller: &Identity, id: PolicyId) -> Result<Amount> {
        self.read(caller, id, FieldTag::Premium).await
    }

    /// Number of successful purchases since the service started.
    pub async fn policy_count(&self) -> u64 {
        self.inner.lock().await.policies.count()
    }

    /// Grant on a field chosen at runtime.
    pub async fn grant(
        &self,
        caller: &Identity,
        id: PolicyId,
        grantee: Identity,
        field: FieldTag,
    ) -> Result<()> {
        let mut inner = self.inner.lock().await;
        let Inner {
            policies,
            access,
            audit,
        } = &mut *inner;

        let mut sink = AuditSink::new(audit);
        let outcome = access.grant(policies, &mut sink, id, caller, grantee.clone(), field);

        match &outcome {
            Ok(()) => info!(policy = %id, grantor = %caller, grantee = %grantee, %field, "access granted"),
            Err(e) => debug!(policy = %id, grantor = %caller, error = %e, "grant rejected"),
        }
        sink.finish(outcome)
    }

    /// Read a field chosen at runtime.
    pub async fn read(&self, caller: &Identity, id: PolicyId, field: FieldTag) -> Result<Amount> {
        let mut inner = self.inner.lock().await;
        let Inner {
            policies,
            access,
            audit,
        } = &mut *inner;

        let mut sink = AuditSink::new(audit);
        let outcome = access.read(policies, &mut sink, id, field, caller);

        match &outcome {
            Ok(_) => debug!(policy = %id, caller = %caller, %field, "field read"),
            Err(policy::Error::AccessDenied { .. }) => {
                warn!(policy = %id, caller = %caller, %field, "access denied")
            }
            Err(e) => debug!(policy = %id, caller = %caller, error = %e, "read rejected"),
        }
        sink.finish(outcome)
    }
}

/// Appends each notification to the audit log as the core emits it.
///
/// The core notifies before mutating, so a failed append leaves the request
/// unapplied. The storage error is kept and returned in place of the
/// core's `Undelivered`.
struct AuditSink<'a> {
    audit: &'a EventStore,
    failure: Option<storage::Error>,
}

impl<'a> AuditSink<'a> {
    fn new(audit: &'a EventStore) -> Self {
        Self {
            audit,
            failure: None,
        }
    }

    fn finish<T>(self, outcome: policy::Result<T>) -> Result<T> {
        match self.failure {
            Some(e) => Err(e.into()),
            None => Ok(outcome?),
        }
    }
}

impl Notifier for AuditSink<'_> {
    fn notify(&mut self, notification: Notification) -> policy::Result<()> {
        self.audit.append(&Event::from(notification)).map_err(|e| {
            let undelivered = policy::Error::Undelivered(e.to_string());
            self.failure = Some(e);
            undelivered
        })
    }
}
