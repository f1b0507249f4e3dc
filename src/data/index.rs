use std::{fs, path::Path};

use indexmap::IndexMap;
use tracing::debug;

use super::*;
use crate::error::ContentError;

/// Every post on the blog, newest first.
///
/// Built once at startup; markdown is rendered while loading so pages are
/// served from memory.
#[derive(Debug)]
pub struct Index {
    pub(super) posts: IndexMap<String, Post>,
}

impl Index {
    /// Read every `*.md` file in `dir` as a post.
    pub fn load(dir: &Path) -> Result<Self, ContentError> {
        let io_error = |source| ContentError::Io {
            path: dir.to_owned(),
            source,
        };

        let mut posts = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("md") {
                continue;
            }
            let Some(slug) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let raw = fs::read_to_string(&path).map_err(|source| ContentError::Io {
                path: path.clone(),
                source,
            })?;
            let post = Post::parse(slug, &raw, &path)?;
            debug!(slug = %post.slug, "loaded post");
            posts.push(post);
        }

        Ok(Self::from_posts(posts))
    }

    /// Build an index from already parsed posts.
    pub fn from_posts(mut posts: Vec<Post>) -> Self {
        posts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug)));
        Index {
            posts: posts.into_iter().map(|p| (p.slug.clone(), p)).collect(),
        }
    }

    /// All posts, newest first.
    pub fn posts(&self) -> impl Iterator<Item = &Post> {
        self.posts.values()
    }

    /// The post with the given slug.
    pub fn post(&self, slug: &str) -> Option<&Post> {
        self.posts.get(slug)
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_post(dir: &Path, slug: &str, title: &str, date: &str) {
        let raw = format!(
            "---\ntitle: \"{title}\"\ndate: \"{date}\"\nauthor:\n  name: Jane\n---\nHello from {slug}.\n"
        );
        fs::write(dir.join(format!("{slug}.md")), raw).unwrap();
    }

    #[test]
    fn loads_markdown_files_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        write_post(dir.path(), "older", "Older", "2023-01-01");
        write_post(dir.path(), "newer", "Newer", "2024-06-01T10:00:00Z");
        fs::write(dir.path().join("notes.txt"), "not a post").unwrap();

        let index = Index::load(dir.path()).unwrap();

        let slugs: Vec<_> = index.posts().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, ["newer", "older"]);
        assert_eq!(index.post("older").unwrap().title, "Older");
        assert!(index.post("notes").is_none());
        assert!(index.post("missing").is_none());
    }

    #[test]
    fn broken_post_fails_the_load() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.md"), "no front matter").unwrap();
        assert!(Index::load(dir.path()).is_err());
    }

    #[test]
    fn missing_directory_fails_the_load() {
        let dir = tempfile::tempdir().unwrap();
        let err = Index::load(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, ContentError::Io { .. }));
    }
}
