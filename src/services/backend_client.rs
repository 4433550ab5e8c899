//! Client for the hosted backend's table and RPC surface.
//!
//! Tables live under `/rest/v1/<table>` and remote procedures under
//! `/rest/v1/rpc/<function>`. Filters are PostgREST query pairs such as
//! `status=eq.published` and `order=published_at.desc`.

use std::fmt::Display;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::types::errors::BackendError;

/// Filter, ordering and paging for a table request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, key: &str, value: String) -> Self {
        self.pairs.push((key.to_string(), value));
        self
    }

    pub fn select(self, columns: &str) -> Self {
        self.push("select", columns.to_string())
    }

    pub fn eq(self, column: &str, value: impl Display) -> Self {
        self.push(column, format!("eq.{}", value))
    }

    pub fn gte(self, column: &str, value: impl Display) -> Self {
        self.push(column, format!("gte.{}", value))
    }

    pub fn order(self, column: &str, ascending: bool) -> Self {
        let dir = if ascending { "asc" } else { "desc" };
        self.push("order", format!("{}.{}", column, dir))
    }

    pub fn limit(self, n: usize) -> Self {
        self.push("limit", n.to_string())
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Whether any row filter (as opposed to select/order/paging) is present.
    pub fn has_filter(&self) -> bool {
        self.pairs
            .iter()
            .any(|(k, _)| !matches!(k.as_str(), "select" | "order" | "limit"))
    }
}

/// Async client for the backend. Cheap to clone.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    access_token: Option<String>,
}

impl BackendClient {
    pub fn new(base_url: &str, anon_key: &str, timeout: Duration) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::NetworkError(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            access_token: None,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, BackendError> {
        Self::new(
            &config.backend_url,
            &config.anon_key,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// A copy of this client that authorizes with `token` instead of the anon key.
    pub fn with_access_token(&self, token: &str) -> Self {
        let mut client = self.clone();
        client.access_token = Some(token.to_string());
        client
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn rpc_url(&self, function: &str) -> String {
        format!("{}/rest/v1/rpc/{}", self.base_url, function)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", bearer))
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, BackendError> {
        let response = builder
            .send()
            .await
            .map_err(|e| BackendError::NetworkError(e.to_string()))?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(error_from_response(response).await)
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::DecodeError(e.to_string()))
    }

    /// `GET /rest/v1/<table>` with `query`.
    pub async fn select<T: DeserializeOwned>(&self, table: &str, query: &Query) -> Result<Vec<T>, BackendError> {
        tracing::debug!(table, query = ?query.pairs(), "select");
        let builder = self
            .request(Method::GET, &self.table_url(table))
            .query(query.pairs());
        let response = self.send(builder).await?;
        Self::decode(response).await
    }

    /// Like [`select`](Self::select) but returns the first row, or `NotFound`.
    pub async fn select_one<T: DeserializeOwned>(&self, table: &str, query: &Query) -> Result<T, BackendError> {
        let rows: Vec<T> = self.select(table, &query.clone().limit(1)).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| BackendError::NotFound(format!("no matching row in {}", table)))
    }

    /// Number of rows matching `query`, read from `Content-Range`.
    pub async fn count(&self, table: &str, query: &Query) -> Result<u64, BackendError> {
        let builder = self
            .request(Method::GET, &self.table_url(table))
            .header("Prefer", "count=exact")
            .query(query.clone().select("id").limit(1).pairs());
        let response = self.send(builder).await?;
        let range = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| BackendError::DecodeError("missing Content-Range header".to_string()))?;
        parse_content_range_total(range)
    }

    /// Inserts one row and returns it as stored.
    pub async fn insert<T, B>(&self, table: &str, body: &B) -> Result<T, BackendError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        tracing::debug!(table, "insert");
        let builder = self
            .request(Method::POST, &self.table_url(table))
            .header("Prefer", "return=representation")
            .json(body);
        let response = self.send(builder).await?;
        let rows: Vec<T> = Self::decode(response).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| BackendError::DecodeError(format!("insert into {} returned no row", table)))
    }

    /// Inserts or merges one row on its primary key.
    pub async fn upsert<T, B>(&self, table: &str, body: &B) -> Result<T, BackendError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        tracing::debug!(table, "upsert");
        let builder = self
            .request(Method::POST, &self.table_url(table))
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(body);
        let response = self.send(builder).await?;
        let rows: Vec<T> = Self::decode(response).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| BackendError::DecodeError(format!("upsert into {} returned no row", table)))
    }

    /// Patches rows matching `query` and returns them as stored.
    pub async fn update<T, B>(&self, table: &str, query: &Query, body: &B) -> Result<Vec<T>, BackendError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        if !query.has_filter() {
            return Err(BackendError::Conflict(format!("refusing unfiltered update on {}", table)));
        }
        tracing::debug!(table, query = ?query.pairs(), "update");
        let builder = self
            .request(Method::PATCH, &self.table_url(table))
            .header("Prefer", "return=representation")
            .query(query.pairs())
            .json(body);
        let response = self.send(builder).await?;
        Self::decode(response).await
    }

    /// Deletes rows matching `query`.
    pub async fn delete(&self, table: &str, query: &Query) -> Result<(), BackendError> {
        if !query.has_filter() {
            return Err(BackendError::Conflict(format!("refusing unfiltered delete on {}", table)));
        }
        tracing::debug!(table, query = ?query.pairs(), "delete");
        let builder = self
            .request(Method::DELETE, &self.table_url(table))
            .query(query.pairs());
        self.send(builder).await?;
        Ok(())
    }

    /// Calls a remote procedure with named arguments.
    pub async fn rpc<T, A>(&self, function: &str, args: &A) -> Result<T, BackendError>
    where
        T: DeserializeOwned,
        A: Serialize + ?Sized,
    {
        tracing::debug!(function, "rpc");
        let builder = self.request(Method::POST, &self.rpc_url(function)).json(args);
        let response = self.send(builder).await?;
        Self::decode(response).await
    }

    /// Calls a remote procedure whose result is ignored.
    pub async fn rpc_unit<A>(&self, function: &str, args: &A) -> Result<(), BackendError>
    where
        A: Serialize + ?Sized,
    {
        tracing::debug!(function, "rpc");
        let builder = self.request(Method::POST, &self.rpc_url(function)).json(args);
        self.send(builder).await?;
        Ok(())
    }
}

async fn error_from_response(response: Response) -> BackendError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| {
            if body.is_empty() {
                status.canonical_reason().unwrap_or("unknown error").to_string()
            } else {
                body
            }
        });

    tracing::warn!(status = status.as_u16(), %message, "backend request failed");
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BackendError::Unauthorized(message),
        StatusCode::NOT_FOUND => BackendError::NotFound(message),
        StatusCode::CONFLICT => BackendError::Conflict(message),
        _ => BackendError::Http {
            status: status.as_u16(),
            message,
        },
    }
}

/// Parses the total out of `Content-Range: 0-9/42` (or `*/0`).
pub fn parse_content_range_total(range: &str) -> Result<u64, BackendError> {
    range
        .rsplit_once('/')
        .and_then(|(_, total)| total.trim().parse().ok())
        .ok_or_else(|| BackendError::DecodeError(format!("bad Content-Range: {}", range)))
}
