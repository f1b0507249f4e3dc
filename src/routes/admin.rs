use chrono::Utc;

use crate::auth;
use crate::error::ModerationError;
use crate::moderation::{self, Action, Confirmation, Dashboard, Tab};
use crate::session::Session;

use super::*;

#[derive(Deserialize)]
pub struct TabQuery {
    tab: Option<Tab>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Deserialize)]
pub struct ConfirmForm {
    confirm: Option<String>,
    tab: Option<Tab>,
}

/// The session restored from the request's session cookie.
async fn session(headers: &HeaderMap, state: &AppState) -> Session {
    let cookie = get_cookie(headers, &state.settings.session.cookie_name);
    auth::restore_session(state.backend.as_ref(), cookie).await
}

fn login_page(headers: &HeaderMap, state: &AppState, status: StatusCode, error: Option<&str>) -> Response {
    (
        status,
        html::pages::admin::login(headers, &state.settings.site, error),
    )
        .into_response()
}

fn dashboard_url(tab: Tab) -> String {
    format!("/admin?tab={}", tab.as_str())
}

fn session_cookie(name: &str, session: &Session) -> String {
    match session.to_cookie_value() {
        Some(value) => {
            let max_age = match session {
                Session::Authenticated { expiry, .. } => (*expiry - Utc::now()).num_seconds().max(0),
                Session::Unauthenticated => 0,
            };
            format!("{name}={value}; Path=/admin; Max-Age={max_age}; HttpOnly; SameSite=Lax")
        }
        None => format!("{name}=; Path=/admin; Max-Age=0; HttpOnly; SameSite=Lax"),
    }
}

/// The login form, or the dashboard when a moderator session is active.
pub async fn dashboard(
    headers: HeaderMap,
    State(state): State<AppState>,
    Query(query): Query<TabQuery>,
) -> Response {
    let session = session(&headers, &state).await;
    if !session.is_active() {
        return login_page(&headers, &state, StatusCode::OK, None);
    }

    let dashboard = match Dashboard::load(state.backend.as_ref(), &session).await {
        Ok(dashboard) => dashboard,
        Err(e) => {
            warn!(error = %e, "could not load dashboard");
            Dashboard::default()
        }
    };
    let tab = query.tab.unwrap_or_default();
    html::pages::admin::dashboard(&headers, &state.settings.site, &dashboard, tab).into_response()
}

pub async fn login(
    headers: HeaderMap,
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Response {
    match auth::login(state.backend.as_ref(), &form.email, &form.password).await {
        Ok(session) => {
            let cookie = session_cookie(&state.settings.session.cookie_name, &session);
            ([(header::SET_COOKIE, cookie)], Redirect::to("/admin")).into_response()
        }
        Err(e) => {
            let message = format!("Login failed: {e}");
            login_page(&headers, &state, StatusCode::UNAUTHORIZED, Some(&message))
        }
    }
}

pub async fn logout(headers: HeaderMap, State(state): State<AppState>) -> Response {
    let session = session(&headers, &state).await;
    auth::logout(state.backend.as_ref(), &session).await;

    let cookie = session_cookie(&state.settings.session.cookie_name, &Session::Unauthenticated);
    ([(header::SET_COOKIE, cookie)], Redirect::to("/admin")).into_response()
}

/// Ask for confirmation before approving or deleting a comment.
pub async fn confirm(
    headers: HeaderMap,
    State(state): State<AppState>,
    ReqPath((action, id)): ReqPath<(Action, i64)>,
    Query(query): Query<TabQuery>,
) -> Response {
    let session = session(&headers, &state).await;
    if !session.is_active() {
        return login_page(&headers, &state, StatusCode::UNAUTHORIZED, None);
    }

    let comment = match moderation::find(state.backend.as_ref(), &session, id).await {
        Ok(comment) => comment,
        Err(e) => {
            warn!(id, error = %e, "could not load comment");
            None
        }
    };
    let tab = query.tab.unwrap_or_default();
    html::pages::admin::confirm(
        &headers,
        &state.settings.site,
        action,
        id,
        comment.as_ref(),
        tab,
    )
    .into_response()
}

/// Run a confirmed moderator action, then send the moderator back to the
/// dashboard, which refetches both lists.
///
/// Backend failures are logged and otherwise ignored.
pub async fn act(
    headers: HeaderMap,
    State(state): State<AppState>,
    ReqPath((action, id)): ReqPath<(Action, i64)>,
    Form(form): Form<ConfirmForm>,
) -> Response {
    let session = session(&headers, &state).await;
    let tab = form.tab.unwrap_or_default();
    let confirmation = match form.confirm.as_deref() {
        Some("yes") => Confirmation::Confirmed,
        _ => Confirmation::Unconfirmed,
    };

    match moderation::apply(state.backend.as_ref(), &session, action, id, confirmation).await {
        Ok(()) => Redirect::to(&dashboard_url(tab)).into_response(),
        Err(ModerationError::NoSession) => {
            login_page(&headers, &state, StatusCode::UNAUTHORIZED, None)
        }
        Err(ModerationError::Unconfirmed) => Redirect::to(&format!(
            "/admin/confirm/{}/{id}?tab={}",
            action.as_str(),
            tab.as_str()
        ))
        .into_response(),
        Err(e) => {
            warn!(id, action = action.as_str(), error = %e, "moderation action failed");
            Redirect::to(&dashboard_url(tab)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::backend::{Backend, MemoryBackend};
    use crate::comments::submit_comment;

    use super::*;

    const EMAIL: &str = "mod@example.com";
    const PASSWORD: &str = "pw";

    fn setup() -> (Arc<MemoryBackend>, axum::Router) {
        let backend = Arc::new(MemoryBackend::with_moderator(EMAIL, PASSWORD));
        let app = crate::app(crate::test_state(backend.clone()));
        (backend, app)
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn form_request(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
        let mut request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        request.body(Body::from(body.to_owned())).unwrap()
    }

    /// Log in and return the `name=value` part of the session cookie.
    async fn log_in(app: &axum::Router) -> String {
        let body = format!("email={}&password={PASSWORD}", EMAIL.replace('@', "%40"));
        let response = app
            .clone()
            .oneshot(form_request("/admin/login", &body, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        set_cookie.split(';').next().unwrap().to_owned()
    }

    #[tokio::test]
    async fn dashboard_needs_login() {
        let (_, app) = setup();
        let response = app
            .oneshot(Request::get("/admin").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("Admin Login"));
        assert!(!body.contains("Comment Dashboard"));
    }

    #[tokio::test]
    async fn bad_login_shows_the_reason() {
        let (_, app) = setup();
        let body = format!("email={}&password=wrong", EMAIL.replace('@', "%40"));
        let response = app
            .oneshot(form_request("/admin/login", &body, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_string(response).await;
        assert!(body.contains("Login failed: Invalid login credentials"));
    }

    #[tokio::test]
    async fn dashboard_is_reachable_right_after_login() {
        let (backend, app) = setup();
        submit_comment(backend.as_ref(), "hello-world", "Jane", "Great read!")
            .await
            .unwrap();

        let cookie = log_in(&app).await;
        let response = app
            .oneshot(
                Request::get("/admin")
                    .header(header::COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let body = body_string(response).await;
        assert!(body.contains("Comment Dashboard"));
        assert!(body.contains("Pending Reviews (1)"));
        assert!(body.contains("Great read!"));
    }

    #[tokio::test]
    async fn approve_without_confirmation_asks_first() {
        let (backend, app) = setup();
        submit_comment(backend.as_ref(), "hello-world", "Jane", "Hi")
            .await
            .unwrap();
        let cookie = log_in(&app).await;

        let response = app
            .clone()
            .oneshot(form_request("/admin/approve/1", "tab=pending", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/admin/confirm/approve/1?tab=pending"
        );

        let response = app
            .oneshot(
                Request::get("/admin/confirm/approve/1")
                    .header(header::COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = body_string(response).await;
        assert!(body.contains("Are you sure you want to APPROVE this comment?"));

        let pending = backend
            .select(
                &Session::Unauthenticated,
                crate::comments::TABLE,
                &crate::backend::Query::new().eq("is_approved", false),
            )
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
    }

    #[tokio::test]
    async fn confirmed_approve_publishes_the_comment() {
        let (backend, app) = setup();
        submit_comment(backend.as_ref(), "hello-world", "Jane", "Great read!")
            .await
            .unwrap();
        let cookie = log_in(&app).await;

        let response = app
            .clone()
            .oneshot(form_request(
                "/admin/approve/1",
                "confirm=yes&tab=pending",
                Some(&cookie),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/admin?tab=pending");

        let response = app
            .oneshot(Request::get("/posts/hello-world").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_string(response).await;
        assert!(body.contains("Great read!"));
        assert!(!body.contains("No comments yet."));
    }

    #[tokio::test]
    async fn anonymous_delete_is_refused() {
        let (backend, app) = setup();
        submit_comment(backend.as_ref(), "hello-world", "Jane", "Hi")
            .await
            .unwrap();

        let response = app
            .oneshot(form_request("/admin/delete/1", "confirm=yes", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(backend.row_count(crate::comments::TABLE), 1);
    }

    #[tokio::test]
    async fn logout_returns_to_the_login_form() {
        let (_, app) = setup();
        let cookie = log_in(&app).await;

        let response = app
            .clone()
            .oneshot(form_request("/admin/logout", "", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let cleared = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cleared.contains("Max-Age=0"));

        // The old cookie no longer works.
        let response = app
            .oneshot(
                Request::get("/admin")
                    .header(header::COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(body_string(response).await.contains("Admin Login"));
    }
}
