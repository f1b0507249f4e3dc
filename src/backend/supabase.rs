use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;

use super::*;

/// Talks to the REST (PostgREST) and auth (GoTrue) endpoints of a Supabase project.
pub struct SupabaseBackend {
    client: Client,
    url: String,
    anon_key: String,
}

impl SupabaseBackend {
    pub fn new(url: &str, anon_key: &str) -> Self {
        SupabaseBackend {
            client: Client::new(),
            url: url.trim_end_matches('/').to_owned(),
            anon_key: anon_key.to_owned(),
        }
    }

    fn rest(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.url, table)
    }

    fn auth(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.url, path)
    }

    /// Attach the project key, and the moderator's token when there is one.
    fn authorize(&self, request: RequestBuilder, session: &Session) -> RequestBuilder {
        let bearer = session.token().unwrap_or(self.anon_key.as_str());
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }
}

/// Render a query as PostgREST query-string parameters.
fn query_params(query: &Query) -> Vec<(String, String)> {
    let mut params = vec![("select".to_owned(), "*".to_owned())];
    for (column, value) in &query.filters {
        let value = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        params.push((column.clone(), format!("eq.{value}")));
    }
    if let Some(order) = &query.order {
        let direction = if order.ascending { "asc" } else { "desc" };
        params.push(("order".to_owned(), format!("{}.{direction}", order.column)));
    }
    params
}

/// Pull a readable reason out of an error body.
///
/// The auth server uses `error_description` or `msg`, the REST server `message`.
fn error_reason(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error_description: Option<String>,
        msg: Option<String>,
        message: Option<String>,
        error: Option<String>,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(e) => e
            .error_description
            .or(e.msg)
            .or(e.message)
            .or(e.error)
            .unwrap_or_else(|| body.to_owned()),
        Err(_) => body.to_owned(),
    }
}

async fn check(response: Response) -> BackendResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(BackendError::Status {
        status: status.as_u16(),
        message: error_reason(&body),
    })
}

#[async_trait]
impl Backend for SupabaseBackend {
    async fn select(
        &self,
        session: &Session,
        table: &str,
        query: &Query,
    ) -> BackendResult<Vec<Value>> {
        let request = self
            .client
            .get(self.rest(table))
            .query(&query_params(query));
        let response = self.authorize(request, session).send().await?;
        let rows = check(response).await?.json().await?;
        Ok(rows)
    }

    async fn insert(&self, session: &Session, table: &str, record: Value) -> BackendResult<()> {
        let request = self
            .client
            .post(self.rest(table))
            .header("Prefer", "return=minimal")
            .json(&[record]);
        let response = self.authorize(request, session).send().await?;
        check(response).await?;
        Ok(())
    }

    async fn update(
        &self,
        session: &Session,
        table: &str,
        id: i64,
        patch: Value,
    ) -> BackendResult<usize> {
        let request = self
            .client
            .patch(self.rest(table))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(&patch);
        let response = self.authorize(request, session).send().await?;
        let rows: Vec<Value> = check(response).await?.json().await?;
        Ok(rows.len())
    }

    async fn delete(&self, session: &Session, table: &str, id: i64) -> BackendResult<usize> {
        let request = self
            .client
            .delete(self.rest(table))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation");
        let response = self.authorize(request, session).send().await?;
        let rows: Vec<Value> = check(response).await?.json().await?;
        Ok(rows.len())
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        #[derive(Deserialize)]
        struct TokenResponse {
            access_token: String,
            expires_in: Option<i64>,
            expires_at: Option<i64>,
        }

        let response = self
            .client
            .post(self.auth("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(BackendError::from)?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError(error_reason(&body)));
        }

        let token: TokenResponse = response.json().await.map_err(BackendError::from)?;
        let expiry = match (token.expires_at, token.expires_in) {
            (Some(at), _) => Utc.timestamp_opt(at, 0).single(),
            (None, Some(secs)) => Some(Utc::now() + Duration::seconds(secs)),
            (None, None) => None,
        }
        .unwrap_or_else(|| Utc::now() + Duration::hours(1));

        Ok(Session::Authenticated {
            token: token.access_token,
            expiry,
        })
    }

    async fn get_session(&self, stored: &Session) -> BackendResult<Session> {
        if !stored.is_active() {
            return Ok(Session::Unauthenticated);
        }

        let request = self.client.get(self.auth("user"));
        let response = self.authorize(request, stored).send().await?;
        match response.status().as_u16() {
            200..=299 => Ok(stored.clone()),
            401 | 403 => Ok(Session::Unauthenticated),
            _ => check(response).await.map(|_| Session::Unauthenticated),
        }
    }

    async fn sign_out(&self, session: &Session) -> BackendResult<()> {
        if session.token().is_none() {
            return Ok(());
        }

        let request = self.client.post(self.auth("logout"));
        let response = self.authorize(request, session).send().await?;
        check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_become_eq_params() {
        let query = Query::new()
            .eq("slug", "post-1")
            .eq("is_approved", true)
            .order("created_at", false);

        assert_eq!(
            query_params(&query),
            vec![
                ("select".to_owned(), "*".to_owned()),
                ("slug".to_owned(), "eq.post-1".to_owned()),
                ("is_approved".to_owned(), "eq.true".to_owned()),
                ("order".to_owned(), "created_at.desc".to_owned()),
            ]
        );
    }

    #[test]
    fn error_reason_prefers_descriptions() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        assert_eq!(error_reason(body), "Invalid login credentials");

        let body = r#"{"code":400,"msg":"Email not confirmed"}"#;
        assert_eq!(error_reason(body), "Email not confirmed");

        assert_eq!(error_reason("gateway timeout"), "gateway timeout");
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let backend = SupabaseBackend::new("https://example.supabase.co/", "key");
        assert_eq!(
            backend.rest("comments"),
            "https://example.supabase.co/rest/v1/comments"
        );
        assert_eq!(backend.auth("logout"), "https://example.supabase.co/auth/v1/logout");
    }
}
