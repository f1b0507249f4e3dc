use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use super::markdown::markdown_to_html;
use crate::error::ContentError;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FrontMatter {
    title: String,
    #[serde(default)]
    excerpt: String,
    date: String,
    author: Author,
    #[serde(default)]
    cover_image: Option<String>,
    #[serde(default)]
    og_image: Option<OgImage>,
}

#[derive(Deserialize)]
struct OgImage {
    url: String,
}

/// The author shown in a post header.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Author {
    /// Display name.
    pub name: String,

    /// Path or URL of the author's picture.
    #[serde(default)]
    pub picture: Option<String>,
}

/// A blog post loaded from a markdown file.
#[derive(Clone, Debug)]
pub struct Post {
    /// The file stem, used in the post's URL.
    pub slug: String,

    pub title: String,

    /// A one-paragraph summary for listings and link previews.
    pub excerpt: String,

    pub date: DateTime<Utc>,

    pub author: Author,

    pub cover_image: Option<String>,

    /// Link preview image. Falls back to the cover image.
    pub og_image: Option<String>,

    /// The markdown body, without front matter.
    pub content: String,

    /// The body rendered to HTML.
    pub html: String,
}

impl Post {
    /// Parse a post file. `path` is only used in error messages.
    pub fn parse(slug: &str, raw: &str, path: &Path) -> Result<Post, ContentError> {
        let Some((front_matter, body)) = split_front_matter(raw) else {
            return Err(ContentError::MissingFrontMatter(path.to_owned()));
        };
        let front_matter: FrontMatter =
            serde_yaml::from_str(front_matter).map_err(|source| ContentError::FrontMatter {
                path: path.to_owned(),
                source,
            })?;

        let date = parse_date(&front_matter.date).ok_or_else(|| ContentError::InvalidDate {
            path: path.to_owned(),
            date: front_matter.date.clone(),
        })?;

        let og_image = front_matter
            .og_image
            .map(|i| i.url)
            .or_else(|| front_matter.cover_image.clone());

        Ok(Post {
            slug: slug.to_owned(),
            title: front_matter.title,
            excerpt: front_matter.excerpt,
            date,
            author: front_matter.author,
            cover_image: front_matter.cover_image,
            og_image,
            html: markdown_to_html(body),
            content: body.to_owned(),
        })
    }
}

/// Split `---` delimited front matter from the body.
fn split_front_matter(raw: &str) -> Option<(&str, &str)> {
    let trimmed = raw.trim_start();
    let after = trimmed.strip_prefix("---")?;
    let end = after.find("\n---")?;
    let front_matter = &after[..end];
    let body = &after[end + 4..];
    // Drop the rest of the closing delimiter line.
    let body = match body.find('\n') {
        Some(newline) => &body[newline + 1..],
        None => "",
    };
    Some((front_matter.trim(), body))
}

/// Accepts full RFC 3339 timestamps or plain `YYYY-MM-DD` dates.
fn parse_date(date: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(date) {
        return Some(date.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;

    const POST: &str = r#"---
title: "Testing without mocks"
excerpt: "Fakes beat mocks."
coverImage: "/assets/blog/testing/cover.jpg"
date: "2024-05-02T09:30:00.000Z"
author:
  name: Jane Doe
  picture: "/assets/blog/authors/jane.jpg"
ogImage:
  url: "/assets/blog/testing/og.jpg"
---

## Why

Because.
"#;

    #[test]
    fn parses_front_matter_and_body() {
        let post = Post::parse("testing", POST, Path::new("testing.md")).unwrap();

        assert_eq!(post.slug, "testing");
        assert_eq!(post.title, "Testing without mocks");
        assert_eq!(post.excerpt, "Fakes beat mocks.");
        assert_eq!(post.date.year(), 2024);
        assert_eq!(post.date.hour(), 9);
        assert_eq!(post.author.name, "Jane Doe");
        assert_eq!(post.cover_image.as_deref(), Some("/assets/blog/testing/cover.jpg"));
        assert_eq!(post.og_image.as_deref(), Some("/assets/blog/testing/og.jpg"));
        assert!(post.content.starts_with("\n## Why"));
        assert!(post.html.contains("<h2>Why</h2>"));
    }

    #[test]
    fn og_image_falls_back_to_cover() {
        let raw = "---\ntitle: T\ndate: 2023-01-09\ncoverImage: /c.jpg\nauthor:\n  name: A\n---\nbody";
        let post = Post::parse("t", raw, Path::new("t.md")).unwrap();
        assert_eq!(post.og_image.as_deref(), Some("/c.jpg"));
        assert_eq!(post.date.day(), 9);
        assert_eq!(post.content, "body");
    }

    #[test]
    fn missing_front_matter_is_an_error() {
        let err = Post::parse("t", "# Just markdown", Path::new("t.md")).unwrap_err();
        assert!(matches!(err, ContentError::MissingFrontMatter(_)));
    }

    #[test]
    fn bad_date_is_an_error() {
        let raw = "---\ntitle: T\ndate: yesterday\nauthor:\n  name: A\n---\n";
        let err = Post::parse("t", raw, Path::new("t.md")).unwrap_err();
        assert!(matches!(err, ContentError::InvalidDate { .. }));
    }
}
