//! Field-level read grants over insurance policies.
//!
//! Core principle: **a third party reads exactly the one field it was granted.**
//!
//! A [`PolicyStore`] holds the records. An [`AccessController`] issues grants
//! and enforces them at read time, reporting every rejected read through a
//! [`Notifier`].
//!
//! ```
//! use policy::{AccessController, FieldTag, Identity, Notification, PolicyId, PolicyStore};
//!
//! let mut store = PolicyStore::new();
//! let access = AccessController::default();
//! let mut events: Vec<Notification> = Vec::new();
//!
//! let owner = Identity::new("owner");
//! store.create(PolicyId(123), 1000, 500, owner.clone())?;
//! access.grant_limit(&mut store, &mut events, PolicyId(123), &owner, Identity::new("bob"))?;
//!
//! let limit = access.read(&store, &mut events, PolicyId(123), FieldTag::Limit, &Identity::new("bob"))?;
//! assert_eq!(limit, 1000);
//! # Ok::<(), policy::Error>(())
//! ```

mod access;
mod config;
mod error;
mod field;
mod notify;
mod record;
mod store;

pub use access::{AccessController, Decision};
pub use config::{AccessConfig, GrantAuthority};
pub use error::{Error, Result};
pub use field::{Amount, FieldTag, Identity, PolicyId};
pub use notify::{Notification, Notifier};
pub use record::Policy;
pub use store::PolicyStore;
