//! Policy error types.

use crate::{FieldTag, Identity, PolicyId};
use thiserror::Error;

/// Policy errors.
///
/// Every variant is terminal for the request that produced it: nothing was
/// mutated, and the caller has to resubmit a corrected request.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Purchase arguments were rejected (zero limit or zero payment).
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// No policy has been purchased under this identifier.
    #[error("policy not found: {0}")]
    PolicyNotFound(PolicyId),

    /// The grantee is the null identity.
    #[error("invalid grantee: null identity cannot receive a grant")]
    InvalidGrantee,

    /// The caller holds no grant for the requested field.
    ///
    /// Deliberately silent about which field, if any, the caller may read.
    #[error("access denied: {caller} may not read {field}")]
    AccessDenied { caller: Identity, field: FieldTag },

    /// Only the owner may grant, and the caller is not the owner.
    #[error("{caller} is not the owner of policy {policy}")]
    NotOwner { policy: PolicyId, caller: Identity },

    /// A notification could not be delivered, so the request was abandoned
    /// before it changed anything.
    #[error("notification not delivered: {0}")]
    Undelivered(String),

    /// Failed to parse configuration or a policy value.
    #[error("failed to parse: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, Error>;
