use super::*;

pub async fn home(headers: HeaderMap, State(state): State<AppState>) -> Markup {
    html::pages::home::home(&headers, &state.settings.site, &state.index)
}

pub async fn post(
    headers: HeaderMap,
    State(state): State<AppState>,
    ReqPath(slug): ReqPath<String>,
) -> Response {
    let Some(post) = state.index.post(&slug) else {
        return not_found(&headers, &state, &slug);
    };

    let comments = approved_comments(&state, &slug).await;
    html::pages::post::post(
        &headers,
        &state.settings.site,
        post,
        &comments,
        ("", ""),
        None,
    )
    .into_response()
}

/// The approved comments on a post. A backend failure shows as no comments.
pub(super) async fn approved_comments(state: &AppState, slug: &str) -> Vec<crate::comments::Comment> {
    match crate::comments::list_approved_comments(state.backend.as_ref(), slug).await {
        Ok(comments) => comments,
        Err(e) => {
            warn!(%slug, error = %e, "could not load comments");
            Vec::new()
        }
    }
}

pub(super) fn not_found(headers: &HeaderMap, state: &AppState, slug: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        html::pages::not_found(headers, &state.settings.site, slug),
    )
        .into_response()
}
