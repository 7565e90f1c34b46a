//! SQLite-backed audit log for fieldguard.
//!
//! Every notification the access core emits (purchases, grants, denials)
//! lands here as an [`Event`]. The log is append-only and is what an auditor
//! reads to answer "who tried to see what, and who let them".
//!
//! # Core Concepts
//!
//! ## EventStore
//!
//! The [`EventStore`] wraps a SQLite database and provides methods to append
//! events and query them per policy or per kind.
//!
//! ## Event
//!
//! An [`Event`] has a unique ID, the [`policy::PolicyId`] it concerns, a
//! timestamp, and an [`EventKind`]:
//! - `PolicyPurchased` — a policy was created or re-created
//! - `AccessGranted` — a grantee received a field grant
//! - `AccessDenied` — a read was rejected
//!
//! A denial alone does not say whether the caller held no grant or a grant
//! for the other field; the preceding `AccessGranted` events do.
//!
//! # Example
//!
//! ```no_run
//! use policy::{FieldTag, Identity, Notification, PolicyId};
//! use storage::{Event, EventStore};
//!
//! let store = EventStore::open("events.db")?;
//!
//! store.append(&Event::from(Notification::AccessDenied {
//!     policy: PolicyId(123),
//!     caller: Identity::new("carol"),
//!     field: FieldTag::Limit,
//! }))?;
//!
//! for event in store.load_policy(PolicyId(123))? {
//!     println!("{}: {:?}", event.timestamp, event.kind);
//! }
//!
//! for summary in store.list_policies()? {
//!     println!("{}: {} denials", summary.policy_id, summary.denials);
//! }
//! # Ok::<(), storage::Error>(())
//! ```

mod error;
mod event;
mod store;

pub use error::{Error, Result};
pub use event::{Event, EventKind};
pub use store::{EventStore, PolicySummary};
