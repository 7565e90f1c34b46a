//! fieldguard runtime — the host environment for the access core.
//!
//! The `policy` crate assumes requests arrive one at a time. [`Service`]
//! provides that guarantee for a multi-task process: it owns the
//! [`policy::PolicyStore`], the [`policy::AccessController`] and the
//! [`storage::EventStore`] audit log behind a single lock, and exposes the
//! caller-facing operations.
//!
//! # Example
//!
//! ```
//! use policy::{AccessConfig, Identity, PolicyId};
//! use runtime::Service;
//! use storage::EventStore;
//!
//! # async fn example() -> runtime::Result<()> {
//! let service = Service::new(EventStore::in_memory()?, AccessConfig::default());
//! let (owner, broker) = (Identity::new("owner"), Identity::new("broker"));
//!
//! service.purchase_policy(&owner, PolicyId(123), 1000, 500).await?;
//! service.grant_access_to_limit(&owner, PolicyId(123), broker.clone()).await?;
//! assert_eq!(service.access_policy_limit(&broker, PolicyId(123)).await?, 1000);
//! assert!(service.access_policy_premium(&broker, PolicyId(123)).await.is_err());
//! # Ok(())
//! # }
//! ```

mod error;
mod service;

pub use error::{Error, Result};
pub use service::Service;
