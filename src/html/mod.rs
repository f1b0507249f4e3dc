use axum::http::HeaderMap;
use maud::{html, Markup, PreEscaped};

use crate::comments::Comment;
use crate::config::Site;
use crate::data::*;
use crate::routes::get_cookie;

pub mod components;
pub mod pages;
mod wrappers;
