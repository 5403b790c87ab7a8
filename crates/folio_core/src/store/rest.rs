//! HTTP implementation of the store contract (PostgREST data API, GoTrue auth).
//!
//! # Responsibility
//! - Render [`SelectQuery`] values as PostgREST query strings.
//! - Attach `apikey` and bearer credentials to every request.
//! - Turn error payloads into [`StoreError::Api`] with the service code kept.
//!
//! # Invariants
//! - Requests carry the session token when signed in, the anon key otherwise.
//! - Writes ask for `return=representation`; an empty representation on
//!   update/delete means the row did not exist (`PGRST116`).

use crate::store::{
    AuthProvider, DataStore, Row, RowId, SelectQuery, Session, StoreError, StoreResult, Table,
    User,
};
use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

const PREFER_REPRESENTATION: &str = "return=representation";

/// Client for a hosted Supabase-style project.
pub struct RestStore {
    client: Client,
    base_url: String,
    anon_key: String,
    session: RwLock<Option<Session>>,
}

impl RestStore {
    /// Builds a client with a per-request timeout.
    pub fn new(
        base_url: impl Into<String>,
        anon_key: impl Into<String>,
        timeout: Duration,
    ) -> StoreResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url, anon_key))
    }

    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        anon_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            session: RwLock::new(None),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }

    fn access_token(&self) -> Option<String> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|session| session.access_token.clone())
    }

    fn set_session(&self, session: Option<Session>) {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = session;
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        let token = self
            .access_token()
            .unwrap_or_else(|| self.anon_key.clone());
        builder.header("apikey", &self.anon_key).bearer_auth(token)
    }

    async fn write(
        &self,
        op: &'static str,
        table: Table,
        builder: RequestBuilder,
    ) -> StoreResult<Vec<Row>> {
        let started_at = Instant::now();
        let response = self
            .authorized(builder)
            .header("Prefer", PREFER_REPRESENTATION)
            .send()
            .await?;
        let rows: Vec<Row> = ensure_success(response).await?.json().await?;
        debug!(
            "event=store_{op} module=store backend=rest status=ok table={table} rows={} duration_ms={}",
            rows.len(),
            started_at.elapsed().as_millis()
        );
        Ok(rows)
    }
}

/// Query-string pairs for a select.
pub(crate) fn select_params(query: &SelectQuery) -> Vec<(&'static str, String)> {
    let select = match query.embed {
        Some(embed) => format!("*,{}(*)", embed.table),
        None => "*".to_string(),
    };
    let mut params = vec![("select", select)];
    if !query.order.is_empty() {
        let order = query
            .order
            .iter()
            .map(|term| {
                let direction = if term.ascending { "asc" } else { "desc" };
                format!("{}.{direction}", term.column)
            })
            .collect::<Vec<_>>()
            .join(",");
        params.push(("order", order));
    }
    if let Some(limit) = query.limit {
        params.push(("limit", limit.to_string()));
    }
    params
}

fn id_filter(id: RowId) -> [(&'static str, String); 1] {
    [("id", format!("eq.{id}"))]
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    code: Option<serde_json::Value>,
    message: Option<String>,
    msg: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

async fn ensure_success(response: Response) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(api_error(status, &body))
}

fn api_error(status: StatusCode, body: &str) -> StoreError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let code = match parsed.code {
        Some(serde_json::Value::String(code)) => Some(code),
        _ => parsed.error.clone(),
    };
    let message = parsed
        .message
        .or(parsed.msg)
        .or(parsed.error_description)
        .or(parsed.error)
        .unwrap_or_else(|| {
            if body.is_empty() {
                status.to_string()
            } else {
                body.to_string()
            }
        });
    StoreError::Api {
        status: status.as_u16(),
        code,
        message,
    }
}

fn single(rows: Vec<Row>, table: Table, id: RowId) -> StoreResult<Row> {
    rows.into_iter()
        .next()
        .ok_or_else(|| StoreError::no_rows(format!("no row with id {id} in table {table}")))
}

#[async_trait]
impl DataStore for RestStore {
    async fn select(&self, query: &SelectQuery) -> StoreResult<Vec<Row>> {
        let started_at = Instant::now();
        let response = self
            .authorized(self.client.get(self.table_url(query.table)))
            .query(&select_params(query))
            .send()
            .await?;
        let rows: Vec<Row> = ensure_success(response).await?.json().await?;
        debug!(
            "event=store_select module=store backend=rest status=ok table={} rows={} duration_ms={}",
            query.table,
            rows.len(),
            started_at.elapsed().as_millis()
        );
        Ok(rows)
    }

    async fn insert(&self, table: Table, row: Row) -> StoreResult<Row> {
        let builder = self.client.post(self.table_url(table)).json(&row);
        self.write("insert", table, builder)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode(format!("insert into {table} returned no row")))
    }

    async fn update(&self, table: Table, id: RowId, patch: Row) -> StoreResult<Row> {
        let builder = self
            .client
            .patch(self.table_url(table))
            .query(&id_filter(id))
            .json(&patch);
        single(self.write("update", table, builder).await?, table, id)
    }

    async fn delete(&self, table: Table, id: RowId) -> StoreResult<()> {
        let builder = self.client.delete(self.table_url(table)).query(&id_filter(id));
        single(self.write("delete", table, builder).await?, table, id).map(|_| ())
    }
}

#[async_trait]
impl AuthProvider for RestStore {
    async fn sign_in(&self, email: &str, password: &str) -> StoreResult<Session> {
        let response = self
            .client
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            let body = response.text().await.unwrap_or_default();
            warn!("event=auth_sign_in module=store backend=rest status=error http_status={status}");
            let message = match api_error(status, &body) {
                StoreError::Api { message, .. } => message,
                other => other.to_string(),
            };
            return Err(StoreError::Unauthorized(message));
        }

        let session: Session = ensure_success(response).await?.json().await?;
        self.set_session(Some(session.clone()));
        info!("event=auth_sign_in module=store backend=rest status=ok");
        Ok(session)
    }

    async fn sign_out(&self) -> StoreResult<()> {
        let Some(token) = self.access_token() else {
            return Ok(());
        };
        self.set_session(None);

        let response = self
            .client
            .post(self.auth_url("logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await?;
        let status = response.status();
        // An already-revoked token still ends the local session.
        if status != StatusCode::UNAUTHORIZED && status != StatusCode::NOT_FOUND {
            ensure_success(response).await?;
        }
        info!("event=auth_sign_out module=store backend=rest status=ok");
        Ok(())
    }

    async fn current_user(&self) -> StoreResult<Option<User>> {
        let Some(token) = self.access_token() else {
            return Ok(None);
        };
        let response = self
            .client
            .get(self.auth_url("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            warn!("event=auth_current_user module=store backend=rest status=expired");
            self.set_session(None);
            return Ok(None);
        }
        let user: User = ensure_success(response).await?.json().await?;
        Ok(Some(user))
    }
}
