use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::backend::{Backend, Query};
use crate::comments::{self, Comment, TABLE};
use crate::error::ModerationError;
use crate::session::Session;

/// Whether the moderator affirmatively confirmed an action.
///
/// Only the confirmation page produces `Confirmed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Unconfirmed,
}

/// A state-changing moderator action on a single comment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// pending → approved
    Approve,

    /// pending or approved → gone
    Delete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Approve => "approve",
            Action::Delete => "delete",
        }
    }

    /// The question put to the moderator before the action runs.
    pub fn prompt(&self) -> &'static str {
        match self {
            Action::Approve => "Are you sure you want to APPROVE this comment?",
            Action::Delete => "Are you sure you want to DELETE this comment permanently?",
        }
    }
}

/// Comments awaiting review, newest first.
pub async fn list_pending(
    backend: &dyn Backend,
    session: &Session,
) -> Result<Vec<Comment>, ModerationError> {
    require_session(session)?;
    let query = Query::new()
        .eq("is_approved", false)
        .order("created_at", false);
    let rows = backend.select(session, TABLE, &query).await?;
    Ok(comments::decode(rows)?)
}

/// Every approved comment, grouped by post.
///
/// Groups appear in the order their slug is first seen in the newest-first
/// approved list, and each group is itself newest first.
pub async fn list_approved_grouped_by_slug(
    backend: &dyn Backend,
    session: &Session,
) -> Result<IndexMap<String, Vec<Comment>>, ModerationError> {
    require_session(session)?;
    let query = Query::new()
        .eq("is_approved", true)
        .order("created_at", false);
    let rows = backend.select(session, TABLE, &query).await?;
    Ok(group_by_slug(comments::decode(rows)?))
}

/// Look up one comment in any state, for the confirmation page.
pub async fn find(
    backend: &dyn Backend,
    session: &Session,
    id: i64,
) -> Result<Option<Comment>, ModerationError> {
    require_session(session)?;
    let rows = backend
        .select(session, TABLE, &Query::new().eq("id", id))
        .await?;
    Ok(comments::decode(rows)?.into_iter().next())
}

/// Group comments by slug in a single pass, keeping first-seen slug order.
pub fn group_by_slug(comments: Vec<Comment>) -> IndexMap<String, Vec<Comment>> {
    let mut groups: IndexMap<String, Vec<Comment>> = IndexMap::new();
    for comment in comments {
        groups.entry(comment.slug.clone()).or_default().push(comment);
    }
    groups
}

/// Clear a comment for public display.
///
/// Approving an already approved comment succeeds and changes nothing.
pub async fn approve(
    backend: &dyn Backend,
    session: &Session,
    id: i64,
    confirmation: Confirmation,
) -> Result<(), ModerationError> {
    require_session(session)?;
    require_confirmation(confirmation)?;

    let changed = backend
        .update(session, TABLE, id, json!({ "is_approved": true }))
        .await?;
    if changed == 0 {
        return Err(ModerationError::NotFound(id));
    }

    info!(id, "comment approved");
    Ok(())
}

/// Permanently remove a comment, whatever its state.
pub async fn delete(
    backend: &dyn Backend,
    session: &Session,
    id: i64,
    confirmation: Confirmation,
) -> Result<(), ModerationError> {
    require_session(session)?;
    require_confirmation(confirmation)?;

    let removed = backend.delete(session, TABLE, id).await?;
    if removed == 0 {
        return Err(ModerationError::NotFound(id));
    }

    info!(id, "comment deleted");
    Ok(())
}

/// Run `action` on a comment.
pub async fn apply(
    backend: &dyn Backend,
    session: &Session,
    action: Action,
    id: i64,
    confirmation: Confirmation,
) -> Result<(), ModerationError> {
    match action {
        Action::Approve => approve(backend, session, id, confirmation).await,
        Action::Delete => delete(backend, session, id, confirmation).await,
    }
}

/// Which list the dashboard is showing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Pending,
    Approved,
}

impl Tab {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Pending => "pending",
            Tab::Approved => "approved",
        }
    }
}

/// Everything the moderation dashboard shows, fetched fresh.
#[derive(Default)]
pub struct Dashboard {
    pub pending: Vec<Comment>,
    pub approved: IndexMap<String, Vec<Comment>>,
}

impl Dashboard {
    /// Run both dashboard queries.
    pub async fn load(backend: &dyn Backend, session: &Session) -> Result<Self, ModerationError> {
        Ok(Dashboard {
            pending: list_pending(backend, session).await?,
            approved: list_approved_grouped_by_slug(backend, session).await?,
        })
    }

    /// The number of approved comments across all posts.
    pub fn approved_count(&self) -> usize {
        self.approved.values().map(Vec::len).sum()
    }
}

fn require_session(session: &Session) -> Result<(), ModerationError> {
    if session.is_active() {
        Ok(())
    } else {
        Err(ModerationError::NoSession)
    }
}

fn require_confirmation(confirmation: Confirmation) -> Result<(), ModerationError> {
    match confirmation {
        Confirmation::Confirmed => Ok(()),
        Confirmation::Unconfirmed => Err(ModerationError::Unconfirmed),
    }
}
