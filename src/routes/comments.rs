use crate::comments::{self, Notice};
use crate::error::CommentError;

use super::*;

#[derive(Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    author: String,
    #[serde(default)]
    content: String,
}

/// Submit the comment form under a post.
///
/// The page is rendered again with a notice. The form is cleared after a
/// successful submission and the new comment is not listed, since it still
/// awaits approval.
pub async fn submit(
    headers: HeaderMap,
    State(state): State<AppState>,
    ReqPath(slug): ReqPath<String>,
    Form(form): Form<CommentForm>,
) -> Response {
    let Some(post) = state.index.post(&slug) else {
        return pages::not_found(&headers, &state, &slug);
    };

    let result =
        comments::submit_comment(state.backend.as_ref(), &slug, &form.author, &form.content).await;
    if let Err(CommentError::Backend(e)) = &result {
        error!(%slug, error = %e, "comment submission failed");
    }

    let notice = Notice::from(&result);
    let status = match &result {
        Ok(()) => StatusCode::OK,
        Err(CommentError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
        Err(CommentError::Backend(_)) => StatusCode::BAD_GATEWAY,
    };
    let form = match &result {
        Ok(()) => ("", ""),
        Err(_) => (form.author.as_str(), form.content.as_str()),
    };

    let approved = pages::approved_comments(&state, &slug).await;
    let page = html::pages::post::post(
        &headers,
        &state.settings.site,
        post,
        &approved,
        form,
        Some(notice),
    );
    (status, page).into_response()
}
