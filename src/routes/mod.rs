use axum::extract::{Form, Path as ReqPath, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};

use maud::Markup;
use serde::Deserialize;
use tracing::{error, warn};

use crate::html;
use crate::AppState;

pub mod admin;
pub mod comments;
pub mod files;
pub mod pages;

/// Read a cookie from the request headers.
pub fn get_cookie<'a>(headers: &'a HeaderMap, key: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|pair| pair.trim().strip_prefix(key)?.strip_prefix('='))
}
