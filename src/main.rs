use std::{sync::Arc, time::Instant};

use anyhow::{bail, Context};
use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use backend::{Backend, MemoryBackend, SupabaseBackend};
use crate::config::{BackendKind, BackendSettings, Settings};

mod auth;
mod backend;
mod comments;
mod config;
mod data;
mod error;
mod html;
mod moderation;
mod routes;
mod session;

#[derive(Clone)]
pub struct AppState {
    index: Arc<data::Index>,
    backend: Arc<dyn Backend>,
    settings: Arc<Settings>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blog=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::new().context("loading configuration")?;

    let index_load_start = Instant::now();
    let index = data::Index::load(&settings.content.posts_dir).context("loading posts")?;
    info!(
        posts = index.len(),
        elapsed = ?index_load_start.elapsed(),
        "index loaded"
    );

    let backend = connect(&settings.backend)?;

    let address = format!("{}:{}", settings.server.host, settings.server.port);
    let state = AppState {
        index: Arc::new(index),
        backend,
        settings: Arc::new(settings),
    };

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {address}"))?;
    info!("listening on {address}");
    axum::serve(listener, app(state)).await?;

    Ok(())
}

/// Build the configured backend.
fn connect(settings: &BackendSettings) -> anyhow::Result<Arc<dyn Backend>> {
    match settings.kind {
        BackendKind::Supabase => {
            if settings.url.is_empty() || settings.anon_key.is_empty() {
                bail!("backend.url and backend.anon_key are required for the supabase backend");
            }
            info!(url = %settings.url, "using supabase backend");
            Ok(Arc::new(SupabaseBackend::new(&settings.url, &settings.anon_key)))
        }
        BackendKind::Memory => {
            warn!("using the in-memory backend; comments are lost on restart");
            let backend = match (&settings.moderator_email, &settings.moderator_password) {
                (Some(email), Some(password)) => MemoryBackend::with_moderator(email, password),
                _ => {
                    warn!("no moderator account configured");
                    MemoryBackend::new()
                }
            };
            Ok(Arc::new(backend))
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::pages::home))
        .route("/admin", get(routes::admin::dashboard))
        .route("/admin/login", post(routes::admin::login))
        .route("/admin/logout", post(routes::admin::logout))
        .route("/admin/confirm/:action/:id", get(routes::admin::confirm))
        .route("/admin/:action/:id", post(routes::admin::act))
        .route("/asset/:file", get(routes::files::asset))
        .route("/posts/:slug", get(routes::pages::post))
        .route("/posts/:slug/comments", post(routes::comments::submit))
        .route("/script/:file", get(routes::files::script))
        .route("/style/:file", get(routes::files::style))
        .with_state(state)
}

/// State with one post, "hello-world", and the given backend.
#[cfg(test)]
pub(crate) fn test_state(backend: Arc<MemoryBackend>) -> AppState {
    use chrono::TimeZone;

    let post = data::Post {
        slug: "hello-world".to_owned(),
        title: "Hello, world".to_owned(),
        excerpt: "The first post.".to_owned(),
        date: chrono::Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
        author: data::Author {
            name: "Jane Doe".to_owned(),
            picture: None,
        },
        cover_image: None,
        og_image: None,
        content: "Welcome!".to_owned(),
        html: data::markdown::markdown_to_html("Welcome!"),
    };

    AppState {
        index: Arc::new(data::Index::from_posts(vec![post])),
        backend,
        settings: Arc::new(Settings::for_tests()),
    }
}
