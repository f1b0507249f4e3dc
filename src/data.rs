use chrono::{DateTime, Utc};

pub use index::Index;
pub use post::{Author, Post};

/// Data structures for the index of every post on the blog.
pub mod index;

/// Markdown to HTML conversion.
pub mod markdown;

/// Data structures for posts.
pub mod post;

/// Format a post date, e.g. "17 October 2026".
pub fn date_string(date: &DateTime<Utc>) -> String {
    date.format("%-d %B %Y").to_string()
}

/// Format a comment date, e.g. "October 17, 2026".
pub fn comment_date_string(date: &DateTime<Utc>) -> String {
    date.format("%B %-d, %Y").to_string()
}
