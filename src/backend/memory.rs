use std::{
    cmp::Ordering,
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering as AtomicOrdering},
        Mutex, MutexGuard, PoisonError,
    },
};

use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rand::Rng;
use serde_json::{Map, Value};

use super::*;

/// How long an issued session stays valid.
const SESSION_LIFETIME_SECS: i64 = 3600;

#[derive(Default)]
struct Tables {
    rows: HashMap<String, Vec<Map<String, Value>>>,
    next_id: i64,
    last_created: Option<DateTime<Utc>>,
    sessions: HashMap<String, DateTime<Utc>>,
}

/// A backend that keeps every table in process memory.
///
/// It assigns sequential ids and strictly increasing `created_at` stamps,
/// supports a single moderator account, and only lets authenticated sessions
/// update or delete rows.
pub struct MemoryBackend {
    tables: Mutex<Tables>,
    moderator: Option<(String, String)>,
    available: AtomicBool,
}

impl MemoryBackend {
    /// A backend with no moderator account.
    pub fn new() -> Self {
        MemoryBackend {
            tables: Mutex::new(Tables {
                next_id: 1,
                ..Default::default()
            }),
            moderator: None,
            available: AtomicBool::new(true),
        }
    }

    /// A backend that accepts the given moderator credentials.
    pub fn with_moderator(email: &str, password: &str) -> Self {
        MemoryBackend {
            moderator: Some((email.to_owned(), password.to_owned())),
            ..Self::new()
        }
    }

    /// Make every subsequent call fail with [`BackendError::Unavailable`], or undo that.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, AtomicOrdering::SeqCst);
    }

    /// The number of rows currently stored in `table`.
    pub fn row_count(&self, table: &str) -> usize {
        self.tables().rows.get(table).map_or(0, Vec::len)
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_available(&self) -> BackendResult<()> {
        if self.available.load(AtomicOrdering::SeqCst) {
            Ok(())
        } else {
            Err(BackendError::Unavailable)
        }
    }

    fn check_authorized(tables: &Tables, session: &Session) -> BackendResult<()> {
        let authorized = session.is_active()
            && session
                .token()
                .and_then(|token| tables.sessions.get(token))
                .is_some_and(|expiry| *expiry > Utc::now());
        if authorized {
            Ok(())
        } else {
            Err(BackendError::Unauthorized)
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Compare two column values the way a database would order them.
fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        (Some(Value::Number(a)), Some(Value::Number(b))) => {
            let a = a.as_f64().unwrap_or(f64::NAN);
            let b = b.as_f64().unwrap_or(f64::NAN);
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        // Nulls sort last.
        (None | Some(Value::Null), Some(_)) => Ordering::Greater,
        (Some(_), None | Some(Value::Null)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

fn matches(row: &Map<String, Value>, query: &Query) -> bool {
    query
        .filters
        .iter()
        .all(|(column, value)| row.get(column) == Some(value))
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn select(
        &self,
        _session: &Session,
        table: &str,
        query: &Query,
    ) -> BackendResult<Vec<Value>> {
        self.check_available()?;
        let tables = self.tables();

        let mut rows: Vec<_> = tables
            .rows
            .get(table)
            .into_iter()
            .flatten()
            .filter(|row| matches(row, query))
            .cloned()
            .collect();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ordering = compare(a.get(&order.column), b.get(&order.column));
                if order.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }

        Ok(rows.into_iter().map(Value::Object).collect())
    }

    async fn insert(&self, _session: &Session, table: &str, record: Value) -> BackendResult<()> {
        self.check_available()?;
        let Value::Object(mut row) = record else {
            return Err(BackendError::Status {
                status: 400,
                message: "record must be a JSON object".to_owned(),
            });
        };

        let mut tables = self.tables();

        // Keep creation stamps strictly increasing so ordering is total.
        let mut created = Utc::now();
        if let Some(last) = tables.last_created {
            if created <= last {
                created = last + Duration::microseconds(1);
            }
        }
        tables.last_created = Some(created);

        let id = tables.next_id;
        tables.next_id += 1;

        row.insert("id".to_owned(), Value::from(id));
        row.insert(
            "created_at".to_owned(),
            Value::from(created.to_rfc3339_opts(SecondsFormat::Micros, true)),
        );
        tables.rows.entry(table.to_owned()).or_default().push(row);

        Ok(())
    }

    async fn update(
        &self,
        session: &Session,
        table: &str,
        id: i64,
        patch: Value,
    ) -> BackendResult<usize> {
        self.check_available()?;
        let mut tables = self.tables();
        Self::check_authorized(&tables, session)?;

        let Value::Object(patch) = patch else {
            return Err(BackendError::Status {
                status: 400,
                message: "patch must be a JSON object".to_owned(),
            });
        };

        let mut changed = 0;
        for row in tables.rows.entry(table.to_owned()).or_default() {
            if row.get("id") == Some(&Value::from(id)) {
                for (column, value) in &patch {
                    row.insert(column.clone(), value.clone());
                }
                changed += 1;
            }
        }

        Ok(changed)
    }

    async fn delete(&self, session: &Session, table: &str, id: i64) -> BackendResult<usize> {
        self.check_available()?;
        let mut tables = self.tables();
        Self::check_authorized(&tables, session)?;

        let rows = tables.rows.entry(table.to_owned()).or_default();
        let before = rows.len();
        rows.retain(|row| row.get("id") != Some(&Value::from(id)));

        Ok(before - rows.len())
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        self.check_available()?;

        let accepted = self
            .moderator
            .as_ref()
            .is_some_and(|(e, p)| e.eq_ignore_ascii_case(email.trim()) && p == password);
        if !accepted {
            return Err(AuthError("Invalid login credentials".to_owned()));
        }

        let token = format!("{:032x}", rand::thread_rng().gen::<u128>());
        let expiry = Utc::now() + Duration::seconds(SESSION_LIFETIME_SECS);
        let mut tables = self.tables();
        let now = Utc::now();
        tables.sessions.retain(|_, expiry| *expiry > now);
        tables.sessions.insert(token.clone(), expiry);

        Ok(Session::Authenticated { token, expiry })
    }

    async fn get_session(&self, stored: &Session) -> BackendResult<Session> {
        self.check_available()?;
        let Some(token) = stored.token() else {
            return Ok(Session::Unauthenticated);
        };

        let tables = self.tables();
        match tables.sessions.get(token) {
            Some(&expiry) if expiry > Utc::now() => Ok(Session::Authenticated {
                token: token.to_owned(),
                expiry,
            }),
            _ => Ok(Session::Unauthenticated),
        }
    }

    async fn sign_out(&self, session: &Session) -> BackendResult<()> {
        self.check_available()?;
        if let Some(token) = session.token() {
            self.tables().sessions.remove(token);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn select_filters_and_orders() {
        let backend = MemoryBackend::new();
        let anon = Session::Unauthenticated;
        for (slug, author) in [("a", "first"), ("b", "second"), ("a", "third")] {
            backend
                .insert(&anon, "comments", json!({ "slug": slug, "author": author }))
                .await
                .unwrap();
        }

        let query = Query::new().eq("slug", "a").order("created_at", false);
        let rows = backend.select(&anon, "comments", &query).await.unwrap();
        let authors: Vec<_> = rows.iter().map(|r| r["author"].as_str().unwrap()).collect();
        assert_eq!(authors, ["third", "first"]);

        let ids: Vec<_> = rows.iter().map(|r| r["id"].as_i64().unwrap()).collect();
        assert_eq!(ids, [3, 1]);
    }

    #[tokio::test]
    async fn mutations_need_a_signed_in_session() {
        let backend = MemoryBackend::with_moderator("mod@example.com", "hunter2");
        let anon = Session::Unauthenticated;
        backend
            .insert(&anon, "comments", json!({ "slug": "a" }))
            .await
            .unwrap();

        let err = backend.delete(&anon, "comments", 1).await.unwrap_err();
        assert!(matches!(err, BackendError::Unauthorized));

        let session = backend
            .sign_in_with_password("mod@example.com", "hunter2")
            .await
            .unwrap();
        let changed = backend
            .update(&session, "comments", 1, json!({ "is_approved": true }))
            .await
            .unwrap();
        assert_eq!(changed, 1);
        assert_eq!(backend.delete(&session, "comments", 1).await.unwrap(), 1);
        assert_eq!(backend.delete(&session, "comments", 1).await.unwrap(), 0);
        assert_eq!(backend.row_count("comments"), 0);
    }

    #[tokio::test]
    async fn sign_out_revokes_the_token() {
        let backend = MemoryBackend::with_moderator("mod@example.com", "hunter2");
        let session = backend
            .sign_in_with_password("mod@example.com", "hunter2")
            .await
            .unwrap();
        assert_eq!(backend.get_session(&session).await.unwrap(), session);

        backend.sign_out(&session).await.unwrap();
        assert_eq!(
            backend.get_session(&session).await.unwrap(),
            Session::Unauthenticated
        );
    }

    #[tokio::test]
    async fn sign_in_prunes_expired_sessions() {
        let backend = MemoryBackend::with_moderator("mod@example.com", "hunter2");
        backend
            .tables()
            .sessions
            .insert("stale".to_owned(), Utc::now() - Duration::minutes(5));

        let session = backend
            .sign_in_with_password("mod@example.com", "hunter2")
            .await
            .unwrap();

        let tables = backend.tables();
        assert_eq!(tables.sessions.len(), 1);
        assert!(!tables.sessions.contains_key("stale"));
        assert!(tables.sessions.contains_key(session.token().unwrap()));
    }

    #[tokio::test]
    async fn wrong_password_is_rejected_with_a_reason() {
        let backend = MemoryBackend::with_moderator("mod@example.com", "hunter2");
        let err = backend
            .sign_in_with_password("mod@example.com", "wrong")
            .await
            .unwrap_err();
        assert_eq!(err.0, "Invalid login credentials");
    }

    #[tokio::test]
    async fn unavailable_backend_fails_every_call() {
        let backend = MemoryBackend::new();
        backend.set_available(false);
        let err = backend
            .select(&Session::Unauthenticated, "comments", &Query::new())
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Unavailable));
    }
}
