//! Observable notifications for external audit.

use crate::{Amount, FieldTag, Identity, PolicyId, Result};
use serde::{Deserialize, Serialize};

/// Something an auditor may want to see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// A policy was purchased (or re-purchased, clearing its grants).
    PolicyPurchased {
        policy: PolicyId,
        owner: Identity,
        limit: Amount,
        premium: Amount,
    },
    /// `grantee` may now read `field`, replacing any earlier grant.
    AccessGranted {
        policy: PolicyId,
        grantor: Identity,
        grantee: Identity,
        field: FieldTag,
    },
    /// A read was rejected.
    AccessDenied {
        policy: PolicyId,
        caller: Identity,
        field: FieldTag,
    },
}

impl Notification {
    pub fn policy(&self) -> PolicyId {
        match self {
            Notification::PolicyPurchased { policy, .. }
            | Notification::AccessGranted { policy, .. }
            | Notification::AccessDenied { policy, .. } => *policy,
        }
    }
}

/// Receives notifications as the core emits them.
///
/// The core notifies before it mutates anything. A delivery error aborts the
/// request with no state change.
pub trait Notifier {
    fn notify(&mut self, notification: Notification) -> Result<()>;
}

/// Buffers notifications in memory.
impl Notifier for Vec<Notification> {
    fn notify(&mut self, notification: Notification) -> Result<()> {
        self.push(notification);
        Ok(())
    }
}
