use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::backend::{Backend, Query};
use crate::error::{BackendError, CommentError, ValidationError};
use crate::session::Session;

/// The backend table holding comments.
pub const TABLE: &str = "comments";

/// Shown after a comment was stored.
pub const SUBMITTED_MESSAGE: &str =
    "Thanks! Your comment has been submitted and is awaiting approval.";

/// Shown when the backend call failed. The real error only goes to the log.
pub const FAILED_MESSAGE: &str = "Something went wrong. Please try again.";

/// A reader comment on a post.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Assigned by the backend.
    pub id: i64,

    /// Assigned by the backend.
    pub created_at: DateTime<Utc>,

    /// The post this comment belongs to.
    pub slug: String,

    pub author: String,

    /// The comment body. Newlines are kept as written.
    pub content: String,

    /// Whether a moderator cleared this comment for public display.
    pub is_approved: bool,
}

/// Decode backend rows into comments.
pub(crate) fn decode(rows: Vec<Value>) -> Result<Vec<Comment>, BackendError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(BackendError::from))
        .collect()
}

/// The approved comments on a post, newest first.
pub async fn list_approved_comments(
    backend: &dyn Backend,
    slug: &str,
) -> Result<Vec<Comment>, BackendError> {
    let query = Query::new()
        .eq("slug", slug)
        .eq("is_approved", true)
        .order("created_at", false);
    let rows = backend
        .select(&Session::Unauthenticated, TABLE, &query)
        .await?;
    decode(rows)
}

/// Check that both fields of the comment form are filled in.
///
/// Whitespace alone does not count.
pub fn validate(author: &str, content: &str) -> Result<(), ValidationError> {
    if author.trim().is_empty() {
        return Err(ValidationError::MissingField("name"));
    }
    if content.trim().is_empty() {
        return Err(ValidationError::MissingField("comment"));
    }
    Ok(())
}

/// Store a new, unapproved comment on a post.
///
/// Nothing is sent to the backend if validation fails.
pub async fn submit_comment(
    backend: &dyn Backend,
    slug: &str,
    author: &str,
    content: &str,
) -> Result<(), CommentError> {
    validate(author, content)?;

    let record = json!({
        "slug": slug,
        "author": author.trim(),
        "content": content.trim(),
        "is_approved": false,
    });
    backend
        .insert(&Session::Unauthenticated, TABLE, record)
        .await?;

    Ok(())
}

/// The message shown under the comment form after a submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notice {
    Submitted,
    Failed,
    Invalid(ValidationError),
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Notice::Submitted => SUBMITTED_MESSAGE.to_owned(),
            Notice::Failed => FAILED_MESSAGE.to_owned(),
            Notice::Invalid(ValidationError::MissingField(field)) => {
                format!("Please fill in your {field}.")
            }
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, Notice::Submitted)
    }
}

impl From<&Result<(), CommentError>> for Notice {
    fn from(result: &Result<(), CommentError>) -> Self {
        match result {
            Ok(()) => Notice::Submitted,
            Err(CommentError::Validation(e)) => Notice::Invalid(*e),
            Err(CommentError::Backend(_)) => Notice::Failed,
        }
    }
}
