use tracing::{info, warn};

use crate::backend::Backend;
use crate::error::AuthError;
use crate::session::Session;

/// Restore the moderator session persisted in the session cookie.
///
/// Expired, malformed or revoked sessions come back as `Unauthenticated`, as
/// does any backend failure while checking.
pub async fn restore_session(backend: &dyn Backend, cookie: Option<&str>) -> Session {
    let Some(cookie) = cookie else {
        return Session::Unauthenticated;
    };

    let stored = Session::from_cookie_value(cookie);
    if !stored.is_active() {
        return Session::Unauthenticated;
    }

    match backend.get_session(&stored).await {
        Ok(session) => session,
        Err(e) => {
            warn!(error = %e, "could not verify stored session");
            Session::Unauthenticated
        }
    }
}

/// Exchange moderator credentials for a session.
pub async fn login(backend: &dyn Backend, email: &str, password: &str) -> Result<Session, AuthError> {
    let session = backend.sign_in_with_password(email.trim(), password).await?;
    info!("moderator signed in");
    Ok(session)
}

/// End a moderator session. Failures are logged; the caller forgets the
/// session either way.
pub async fn logout(backend: &dyn Backend, session: &Session) {
    if let Err(e) = backend.sign_out(session).await {
        warn!(error = %e, "sign out failed");
    }
}
