use async_trait::async_trait;
use serde_json::Value;

use crate::error::{AuthError, BackendError};
use crate::session::Session;

pub use memory::MemoryBackend;
pub use supabase::SupabaseBackend;

/// In-process backend holding rows in memory.
pub mod memory;

/// Client for a hosted Supabase project.
pub mod supabase;

pub type BackendResult<T> = Result<T, BackendError>;

/// A filtered, ordered read over a table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Query {
    /// Equality filters, all of which must hold.
    pub filters: Vec<(String, Value)>,

    /// Optional ordering column.
    pub order: Option<Order>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `column` to equal `value`.
    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push((column.to_owned(), value.into()));
        self
    }

    /// Order the result by `column`.
    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.to_owned(),
            ascending,
        });
        self
    }
}

/// The operations the blog consumes from its hosted data and auth service.
///
/// Data operations take the caller's session so the backend can apply its own
/// row-level rules; public callers pass [`Session::Unauthenticated`].
#[async_trait]
pub trait Backend: Send + Sync {
    /// Read the rows of `table` matching `query`.
    async fn select(&self, session: &Session, table: &str, query: &Query)
        -> BackendResult<Vec<Value>>;

    /// Insert one row. The backend assigns `id` and `created_at`.
    async fn insert(&self, session: &Session, table: &str, record: Value) -> BackendResult<()>;

    /// Merge `patch` into the row with the given id. Returns the number of rows changed.
    async fn update(&self, session: &Session, table: &str, id: i64, patch: Value)
        -> BackendResult<usize>;

    /// Remove the row with the given id. Returns the number of rows removed.
    async fn delete(&self, session: &Session, table: &str, id: i64) -> BackendResult<usize>;

    /// Exchange credentials for a session.
    async fn sign_in_with_password(&self, email: &str, password: &str)
        -> Result<Session, AuthError>;

    /// Check a previously issued session, returning it if it is still valid.
    async fn get_session(&self, stored: &Session) -> BackendResult<Session>;

    /// Invalidate a session.
    async fn sign_out(&self, session: &Session) -> BackendResult<()>;
}
