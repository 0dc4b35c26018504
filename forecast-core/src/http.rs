//! Transport seam between the forecast client and the network.
//!
//! Implementations classify failures themselves: a response with a
//! non-success status becomes [`HttpError::Response`], anything that never
//! produced a response becomes [`HttpError::Network`].

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::{fmt::Debug, time::Duration};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self { url: url.into(), query: Vec::new(), headers: Vec::new() }
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Value,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum HttpError {
    #[error("request failed with status {status}: {body}")]
    Response { status: u16, body: Value },

    #[error("{message}")]
    Network { message: String },
}

#[async_trait]
pub trait HttpRequester: Send + Sync + Debug {
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError>;
}

/// [`HttpRequester`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestRequester {
    http: Client,
}

impl ReqwestRequester {
    pub fn new() -> Self {
        Self { http: Client::new() }
    }

    pub fn with_timeout(timeout: Duration) -> anyhow::Result<Self> {
        use anyhow::Context;

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { http })
    }
}

impl Default for ReqwestRequester {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpRequester for ReqwestRequester {
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        let mut builder = self.http.get(&request.url).query(&request.query);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let res = builder
            .send()
            .await
            .map_err(|e| HttpError::Network { message: e.to_string() })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| HttpError::Network { message: e.to_string() })?;

        if !status.is_success() {
            let body = serde_json::from_str(&body).unwrap_or(Value::String(body));
            return Err(HttpError::Response { status: status.as_u16(), body });
        }

        let body = serde_json::from_str(&body).map_err(|e| HttpError::Network {
            message: format!("invalid JSON in response body: {e}"),
        })?;

        Ok(HttpResponse { status: status.as_u16(), body })
    }
}
