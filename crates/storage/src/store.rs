//! SQLite event store implementation.

use crate::{Error, Event, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use policy::PolicyId;
use rusqlite::{Connection, params, params_from_iter};
use std::path::Path;

/// Per-policy rollup of the audit log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicySummary {
    pub policy_id: PolicyId,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub purchases: u64,
    pub grants: u64,
    pub denials: u64,
}

/// SQLite-backed audit log.
pub struct EventStore {
    conn: Connection,
}

impl EventStore {
    /// Open or create an event store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory event store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    // Timestamps are fixed-width RFC 3339 so that text order is time order.
    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS events (
                id TEXT PRIMARY KEY,
                policy_id TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                kind TEXT NOT NULL,
                data TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_events_policy
                ON events(policy_id, timestamp);
            "#,
        )?;
        Ok(())
    }

    /// Append an event to the store.
    pub fn append(&self, event: &Event) -> Result<()> {
        self.conn.execute(
            "INSERT INTO events (id, policy_id, timestamp, kind, data) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                event.id.to_string(),
                event.policy_id.to_string(),
                event.timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true),
                event.kind.name(),
                serde_json::to_string(&event.kind)?,
            ],
        )?;
        Ok(())
    }

    /// Load all events for a policy, oldest first.
    pub fn load_policy(&self, policy_id: PolicyId) -> Result<Vec<Event>> {
        self.load_events(Some(policy_id), None)
    }

    /// Load events, optionally narrowed to one policy and/or one kind
    /// (`policy_purchased`, `access_granted`, `access_denied`).
    pub fn load_events(&self, policy_id: Option<PolicyId>, kind: Option<&str>) -> Result<Vec<Event>> {
        let mut sql = String::from("SELECT id, policy_id, timestamp, data FROM events");
        let mut clauses = Vec::new();
        let mut args = Vec::new();
        if let Some(policy_id) = policy_id {
            args.push(policy_id.to_string());
            clauses.push(format!("policy_id = ?{}", args.len()));
        }
        if let Some(kind) = kind {
            args.push(kind.to_string());
            clauses.push(format!("kind = ?{}", args.len()));
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY timestamp, rowid");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(args.iter()), |row| {
                let id: String = row.get(0)?;
                let policy_id: String = row.get(1)?;
                let timestamp: String = row.get(2)?;
                let data: String = row.get(3)?;
                Ok((id, policy_id, timestamp, data))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, policy_id, timestamp, data)| decode(id, &policy_id, &timestamp, &data))
            .collect()
    }

    /// Summarize every policy that appears in the log, most recently active first.
    pub fn list_policies(&self) -> Result<Vec<PolicySummary>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT policy_id,
                   MIN(timestamp),
                   MAX(timestamp),
                   SUM(kind = 'policy_purchased'),
                   SUM(kind = 'access_granted'),
                   SUM(kind = 'access_denied')
            FROM events
            GROUP BY policy_id
            ORDER BY MAX(timestamp) DESC
            "#,
        )?;

        let rows = stmt
            .query_map([], |row| {
                let policy_id: String = row.get(0)?;
                let first: String = row.get(1)?;
                let last: String = row.get(2)?;
                let purchases: i64 = row.get(3)?;
                let grants: i64 = row.get(4)?;
                let denials: i64 = row.get(5)?;
                Ok((policy_id, first, last, purchases, grants, denials))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(policy_id, first, last, purchases, grants, denials)| -> Result<PolicySummary> {
                Ok(PolicySummary {
                    policy_id: parse_policy_id(&policy_id, &policy_id)?,
                    first_seen: parse_timestamp(&policy_id, &first)?,
                    last_seen: parse_timestamp(&policy_id, &last)?,
                    purchases: parse_count(&policy_id, purchases)?,
                    grants: parse_count(&policy_id, grants)?,
                    denials: parse_count(&policy_id, denials)?,
                })
            })
            .collect()
    }
}

fn decode(id: String, policy_id: &str, timestamp: &str, data: &str) -> Result<Event> {
    let event_id = id.parse().map_err(|e: uuid::Error| corrupt(&id, e))?;
    Ok(Event {
        id: event_id,
        policy_id: parse_policy_id(&id, policy_id)?,
        timestamp: parse_timestamp(&id, timestamp)?,
        kind: serde_json::from_str(data)?,
    })
}

fn parse_policy_id(row: &str, raw: &str) -> Result<PolicyId> {
    raw.parse().map_err(|e: policy::Error| corrupt(row, e))
}

fn parse_timestamp(row: &str, raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| corrupt(row, e))
}

fn parse_count(row: &str, raw: i64) -> Result<u64> {
    u64::try_from(raw).map_err(|e| corrupt(row, e))
}

fn corrupt(row: &str, reason: impl std::fmt::Display) -> Error {
    Error::Corrupt {
        id: row.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EventKind;
    use policy::{FieldTag, Identity};

    fn purchased(policy: u64) -> Event {
        Event::new(
            PolicyId(policy),
            EventKind::PolicyPurchased {
                owner: Identity::new("owner"),
                limit: 1000,
                premium: 500,
            },
        )
    }

    fn denied(policy: u64, caller: &str) -> Event {
        Event::new(
            PolicyId(policy),
            EventKind::AccessDenied {
                caller: Identity::new(caller),
                field: FieldTag::Premium,
            },
        )
    }

    #[test]
    fn test_append_and_load_policy() {
        let store = EventStore::in_memory().unwrap();
        store.append(&purchased(123)).unwrap();
        store.append(&denied(123, "carol")).unwrap();
        store.append(&purchased(456)).unwrap();

        let events = store.load_policy(PolicyId(123)).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind.name(), "policy_purchased");
        assert_eq!(
            events[1].kind,
            EventKind::AccessDenied {
                caller: Identity::new("carol"),
                field: FieldTag::Premium,
            }
        );
    }

    #[test]
    fn test_kind_filter() {
        let store = EventStore::in_memory().unwrap();
        store.append(&purchased(1)).unwrap();
        store.append(&denied(1, "a")).unwrap();
        store.append(&denied(2, "b")).unwrap();

        assert_eq!(store.load_events(None, Some("access_denied")).unwrap().len(), 2);
        assert_eq!(
            store
                .load_events(Some(PolicyId(1)), Some("access_denied"))
                .unwrap()
                .len(),
            1
        );
        assert_eq!(store.load_events(None, None).unwrap().len(), 3);
        assert!(store.load_events(None, Some("nope")).unwrap().is_empty());
    }

    #[test]
    fn test_list_policies() {
        let store = EventStore::in_memory().unwrap();
        store.append(&purchased(7)).unwrap();
        store.append(&denied(7, "a")).unwrap();
        store.append(&denied(7, "b")).unwrap();

        let summaries = store.list_policies().unwrap();
        assert_eq!(summaries.len(), 1);
        let summary = &summaries[0];
        assert_eq!(summary.policy_id, PolicyId(7));
        assert_eq!(summary.purchases, 1);
        assert_eq!(summary.grants, 0);
        assert_eq!(summary.denials, 2);
        assert!(summary.first_seen <= summary.last_seen);
    }

    #[test]
    fn test_negative_count_is_corrupt() {
        assert_eq!(parse_count("7", 3).unwrap(), 3);
        assert!(matches!(parse_count("7", -1), Err(Error::Corrupt { .. })));
    }

    #[test]
    fn test_empty_store() {
        let store = EventStore::in_memory().unwrap();
        assert!(store.list_policies().unwrap().is_empty());
        assert!(store.load_policy(PolicyId(1)).unwrap().is_empty());
    }
}
