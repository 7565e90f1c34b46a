//! Event types for the audit log.

use chrono::{DateTime, Utc};
use policy::{Amount, FieldTag, Identity, Notification, PolicyId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What happened to a policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    /// The policy was purchased; any earlier grants are gone.
    PolicyPurchased {
        owner: Identity,
        limit: Amount,
        premium: Amount,
    },
    /// A grant was issued.
    AccessGranted {
        grantor: Identity,
        grantee: Identity,
        field: FieldTag,
    },
    /// A read was rejected.
    AccessDenied { caller: Identity, field: FieldTag },
}

impl EventKind {
    /// Name stored in the `kind` column and accepted by kind filters.
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::PolicyPurchased { .. } => "policy_purchased",
            EventKind::AccessGranted { .. } => "access_granted",
            EventKind::AccessDenied { .. } => "access_denied",
        }
    }
}

/// An entry in the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub policy_id: PolicyId,
    pub timestamp: DateTime<Utc>,
    pub kind: EventKind,
}

impl Event {
    pub fn new(policy_id: PolicyId, kind: EventKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            policy_id,
            timestamp: Utc::now(),
            kind,
        }
    }
}

impl From<Notification> for Event {
    fn from(notification: Notification) -> Self {
        let policy_id = notification.policy();
        let kind = match notification {
            Notification::PolicyPurchased {
                owner,
                limit,
                premium,
                ..
            } => EventKind::PolicyPurchased {
                owner,
                limit,
                premium,
            },
            Notification::AccessGranted {
                grantor,
                grantee,
                field,
                ..
            } => EventKind::AccessGranted {
                grantor,
                grantee,
                field,
            },
            Notification::AccessDenied { caller, field, .. } => {
                EventKind::AccessDenied { caller, field }
            }
        };
        Self::new(policy_id, kind)
    }
}
