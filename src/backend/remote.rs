//! Hosted Backend Client
//!
//! REST client for the hosted database/auth service. Table access follows the
//! PostgREST dialect (`/rest/v1`), auth the GoTrue endpoints (`/auth/v1`) and
//! blob uploads the storage endpoints (`/storage/v1`).

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use super::{
    AuthError, AuthProvider, AuthSession, AuthUser, DataError, DataResult, DataSource, Filter,
    Query, Row, Table,
};
use crate::config::BackendConfig;

/// Client for the hosted backend
pub struct RemoteBackend {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RemoteBackend {
    /// Create a client from the backend configuration
    pub fn new(config: &BackendConfig) -> DataResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn rest_url(&self, table: Table) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Attach the project key used for every call
    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn send(&self, builder: RequestBuilder) -> DataResult<Response> {
        builder.send().await.map_err(DataError::from_transport)
    }

    /// Turn a non-success response into the matching error
    async fn api_error(table: Option<Table>, response: Response) -> DataError {
        let status = response.status();
        let message = response.text().await.unwrap_or_default();

        match (status, table) {
            (StatusCode::CONFLICT, Some(table)) => DataError::Conflict {
                table: table.to_string(),
                message,
            },
            _ => DataError::Api {
                status: status.as_u16(),
                message,
            },
        }
    }

    async fn rows(table: Table, response: Response) -> DataResult<Vec<Row>> {
        if !response.status().is_success() {
            return Err(Self::api_error(Some(table), response).await);
        }
        response
            .json::<Vec<Row>>()
            .await
            .map_err(|e| DataError::Decode(e.to_string()))
    }
}

/// Translate a query into PostgREST query-string pairs
pub(crate) fn query_params(query: &Query) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];

    for filter in &query.filters {
        match filter {
            Filter::Or(inner) => {
                let parts: Vec<String> = inner.iter().filter_map(or_clause).collect();
                params.push(("or".to_string(), format!("({})", parts.join(","))));
            }
            other => {
                if let Some((column, expr)) = column_clause(other) {
                    params.push((column, expr));
                }
            }
        }
    }

    if let Some(order) = &query.order {
        let direction = if order.ascending { "asc" } else { "desc" };
        params.push(("order".to_string(), format!("{}.{}", order.column, direction)));
    }

    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }

    params
}

/// `column=op.value` form of a single filter
fn column_clause(filter: &Filter) -> Option<(String, String)> {
    match filter {
        Filter::Eq(column, Value::Null) => Some((column.clone(), "is.null".to_string())),
        Filter::Eq(column, value) => Some((column.clone(), format!("eq.{}", plain(value)))),
        Filter::Gte(column, value) => Some((column.clone(), format!("gte.{}", plain(value)))),
        Filter::Lte(column, value) => Some((column.clone(), format!("lte.{}", plain(value)))),
        Filter::Or(_) => None,
    }
}

/// `column.op.value` form used inside `or=(...)`
fn or_clause(filter: &Filter) -> Option<String> {
    let (column, op, value) = match filter {
        Filter::Eq(column, Value::Null) => return Some(format!("{}.is.null", column)),
        Filter::Eq(column, value) => (column, "eq", value),
        Filter::Gte(column, value) => (column, "gte", value),
        Filter::Lte(column, value) => (column, "lte", value),
        // Nested OR is not used
        Filter::Or(_) => return None,
    };
    Some(format!("{}.{}.{}", column, op, quoted(value)))
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Values inside `or=(...)` are double-quoted so commas and dots survive
fn quoted(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
        other => other.to_string(),
    }
}

#[async_trait]
impl DataSource for RemoteBackend {
    fn name(&self) -> &str {
        "remote"
    }

    async fn health_check(&self) -> DataResult<()> {
        let url = format!("{}/auth/v1/health", self.base_url);
        let response = self.send(self.authorized(self.client.get(&url))).await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(DataError::Unavailable)
        }
    }

    async fn list(&self, query: &Query) -> DataResult<Vec<Row>> {
        let request = self
            .client
            .get(self.rest_url(query.table))
            .query(&query_params(query));

        let response = self.send(self.authorized(request)).await?;
        Self::rows(query.table, response).await
    }

    async fn get(&self, table: Table, id: &str) -> DataResult<Option<Row>> {
        let query = Query::table(table).eq("id", id).limit(1);
        Ok(self.list(&query).await?.into_iter().next())
    }

    async fn insert(&self, table: Table, row: Row) -> DataResult<Row> {
        let request = self
            .client
            .post(self.rest_url(table))
            .header("Prefer", "return=representation")
            .json(&vec![row]);

        let response = self.send(self.authorized(request)).await?;
        Self::rows(table, response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DataError::Decode(format!("insert into {} returned no row", table)))
    }

    async fn update(&self, table: Table, id: &str, changes: Row) -> DataResult<Row> {
        let request = self
            .client
            .patch(self.rest_url(table))
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(&changes);

        let response = self.send(self.authorized(request)).await?;
        Self::rows(table, response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DataError::NotFound {
                table: table.to_string(),
                id: id.to_string(),
            })
    }

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> DataResult<String> {
        let encoded: Vec<String> = path
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            bucket,
            encoded.join("/")
        );

        let request = self
            .client
            .post(&url)
            .header("Content-Type", content_type)
            .header("x-upsert", "false")
            .body(bytes);

        let response = self.send(self.authorized(request)).await?;
        if !response.status().is_success() {
            return Err(Self::api_error(None, response).await);
        }

        Ok(format!("{}/{}", bucket, path))
    }
}

// ============================================
// Auth DTOs
// ============================================

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct SignUpResponse {
    #[serde(default)]
    user: Option<AuthUser>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

#[async_trait]
impl AuthProvider for RemoteBackend {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let url = format!("{}/auth/v1/signup", self.base_url);
        let request = self.client.post(&url).json(&Credentials { email, password });
        let response = self.send(self.authorized(request)).await?;

        let status = response.status();
        if status == StatusCode::UNPROCESSABLE_ENTITY || status == StatusCode::BAD_REQUEST {
            let message = response.text().await.unwrap_or_default();
            if message.contains("already registered") || message.contains("already exists") {
                return Err(AuthError::EmailTaken(email.to_string()));
            }
            return Err(DataError::Api {
                status: status.as_u16(),
                message,
            }
            .into());
        }
        if !status.is_success() {
            return Err(Self::api_error(None, response).await.into());
        }

        // Either a bare user or a session wrapping one, depending on whether
        // email confirmation is enabled on the project.
        let body: SignUpResponse = response
            .json()
            .await
            .map_err(|e| DataError::Decode(e.to_string()))?;

        match (body.user, body.id) {
            (Some(user), _) => Ok(user),
            (None, Some(id)) => Ok(AuthUser {
                id,
                email: body.email,
            }),
            (None, None) => Err(DataError::Decode("sign-up response has no user".into()).into()),
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let url = format!("{}/auth/v1/token", self.base_url);
        let request = self
            .client
            .post(&url)
            .query(&[("grant_type", "password")])
            .json(&Credentials { email, password });
        let response = self.send(self.authorized(request)).await?;

        match response.status() {
            s if s.is_success() => response
                .json::<AuthSession>()
                .await
                .map_err(|e| DataError::Decode(e.to_string()).into()),
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => Err(AuthError::InvalidCredentials),
            _ => Err(Self::api_error(None, response).await.into()),
        }
    }

    async fn current_user(&self, access_token: &str) -> Result<Option<AuthUser>, AuthError> {
        let url = format!("{}/auth/v1/user", self.base_url);
        let request = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(access_token);
        let response = self.send(request).await?;

        match response.status() {
            s if s.is_success() => Ok(Some(
                response
                    .json::<AuthUser>()
                    .await
                    .map_err(|e| DataError::Decode(e.to_string()))?,
            )),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            _ => Err(Self::api_error(None, response).await.into()),
        }
    }
}
