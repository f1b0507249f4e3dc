use std::path::PathBuf;

/// A call to the hosted backend failed.
///
/// No distinction is made between transient and permanent failures.
#[derive(thiserror::Error, Debug)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed record: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("not authorized for this operation")]
    Unauthorized,

    #[error("backend unavailable")]
    Unavailable,
}

/// Credentials were rejected. The reason is meant to be shown to the moderator.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct AuthError(pub String);

impl From<BackendError> for AuthError {
    fn from(err: BackendError) -> Self {
        AuthError(err.to_string())
    }
}

/// A required form field was left empty.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
}

#[derive(thiserror::Error, Debug)]
pub enum CommentError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

#[derive(thiserror::Error, Debug)]
pub enum ModerationError {
    #[error("no active moderator session")]
    NoSession,

    #[error("action was not confirmed")]
    Unconfirmed,

    #[error("comment {0} does not exist")]
    NotFound(i64),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// The post directory could not be loaded.
#[derive(thiserror::Error, Debug)]
pub enum ContentError {
    #[error("error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("bad front matter in {path:?}: {source}")]
    FrontMatter {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("post {0:?} has no front matter")]
    MissingFrontMatter(PathBuf),

    #[error("post {path:?} has an invalid date {date:?}")]
    InvalidDate { path: PathBuf, date: String },
}
