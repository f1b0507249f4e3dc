use std::path::PathBuf;

use ::config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub site: Site,
    pub content: Content,
    pub backend: BackendSettings,
    pub session: SessionSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Site {
    pub title: String,
    pub tagline: String,
    pub author: String,
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Content {
    pub posts_dir: PathBuf,
    pub static_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Supabase,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendSettings {
    pub kind: BackendKind,
    pub url: String,
    pub anon_key: String,

    /// Moderator account of the in-memory backend.
    pub moderator_email: Option<String>,
    pub moderator_password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    pub cookie_name: String,
}

#[cfg(debug_assertions)]
const DEFAULT_PORT: u16 = 3000;

#[cfg(not(debug_assertions))]
const DEFAULT_PORT: u16 = 80;

impl Settings {
    /// Defaults, then `blog.toml` if present, then `BLOG_*` environment
    /// variables (`__` separates sections, e.g. `BLOG_BACKEND__URL`).
    pub fn new() -> Result<Self, ConfigError> {
        let mut builder = Self::defaults()?;

        if std::path::Path::new("blog.toml").exists() {
            builder = builder.add_source(File::with_name("blog"));
        }

        builder = builder.add_source(
            Environment::with_prefix("BLOG")
                .prefix_separator("_")
                .separator("__"),
        );

        builder.build()?.try_deserialize()
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", i64::from(DEFAULT_PORT))?
            .set_default("site.title", "Blog.")?
            .set_default(
                "site.tagline",
                "A personal blog about projects, insights and opinions on tech.",
            )?
            .set_default("site.author", "The author")?
            .set_default("site.base_url", "http://localhost:3000")?
            .set_default("content.posts_dir", "_posts")?
            .set_default("content.static_dir", "static")?
            .set_default("backend.kind", "supabase")?
            .set_default("backend.url", "")?
            .set_default("backend.anon_key", "")?
            .set_default("session.cookie_name", "blog_session")
    }
}

#[cfg(test)]
impl Settings {
    /// Defaults only, with the in-memory backend.
    pub fn for_tests() -> Self {
        Self::defaults()
            .and_then(|b| b.set_override("backend.kind", "memory"))
            .and_then(|b| b.build())
            .and_then(|c| c.try_deserialize())
            .expect("default settings deserialize")
    }
}
