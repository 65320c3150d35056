//! Blocking REST client used by test scenarios.
//!
//! # Design
//! Every verb funnels into [`ApiClient::send`], which builds one
//! `HttpRequest` from the enumerated method, hands it to the transport and
//! normalizes the reply into an [`ApiResponse`]. The URL is the configured
//! base URL followed by the endpoint verbatim. Headers are the store's
//! defaults overlaid with whatever the caller passes: a caller header
//! replaces the default of the same name and leaves the others alone.
//!
//! Status codes are data. A 404 or 500 comes back as `Ok`; only a failed
//! exchange is a `TransportError`.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::config::{ConfigStore, Headers};
use crate::error::{ConfigError, TransportError};
use crate::http::{HttpMethod, HttpRequest};
use crate::logging::preview;
use crate::transport::{Transport, UreqTransport};

/// Status code and full body of one exchange.
///
/// A response without a body carries an empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    status_code: u16,
    body: String,
}

impl ApiResponse {
    pub fn new(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            body: body.into(),
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn into_body(self) -> String {
        self.body
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Decode the body into a typed value.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    pub fn json_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Client for the configured API. Owns its transport; call
/// [`close`](ApiClient::close) or drop it when the scenario is done.
pub struct ApiClient<T: Transport = UreqTransport> {
    config: Arc<ConfigStore>,
    transport: T,
    preview_length: usize,
}

impl ApiClient<UreqTransport> {
    /// Client with a pooled `ureq` transport bounded by the configured
    /// response timeout.
    pub fn new(config: Arc<ConfigStore>) -> Result<Self, ConfigError> {
        let transport = UreqTransport::new(config.timeout()?);
        Self::with_transport(config, transport)
    }

    /// Client over the process-wide [`ConfigStore::shared`] store.
    pub fn from_shared() -> Result<Self, ConfigError> {
        Self::new(ConfigStore::shared()?)
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn with_transport(config: Arc<ConfigStore>, transport: T) -> Result<Self, ConfigError> {
        let preview_length = config.preview_length()?;
        Ok(Self {
            config,
            transport,
            preview_length,
        })
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Override how many body characters the response log line shows.
    pub fn set_preview_length(&mut self, limit: usize) {
        self.preview_length = limit;
    }

    pub fn get(&self, endpoint: &str) -> Result<ApiResponse, TransportError> {
        self.send(HttpMethod::Get, endpoint, None, None)
    }

    /// GET with extra headers overlaid on the defaults.
    ///
    /// Overlay keys compare exactly: `accept` does not replace the default
    /// `Accept`, so both go out on the wire. Such near-collisions are logged
    /// at WARN. The same holds for every `*_with` verb.
    pub fn get_with(&self, endpoint: &str, headers: &Headers) -> Result<ApiResponse, TransportError> {
        self.send(HttpMethod::Get, endpoint, None, Some(headers))
    }

    pub fn post(&self, endpoint: &str, body: &str) -> Result<ApiResponse, TransportError> {
        self.send(HttpMethod::Post, endpoint, Some(body), None)
    }

    pub fn post_with(
        &self,
        endpoint: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<ApiResponse, TransportError> {
        self.send(HttpMethod::Post, endpoint, Some(body), Some(headers))
    }

    pub fn put(&self, endpoint: &str, body: &str) -> Result<ApiResponse, TransportError> {
        self.send(HttpMethod::Put, endpoint, Some(body), None)
    }

    pub fn put_with(
        &self,
        endpoint: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<ApiResponse, TransportError> {
        self.send(HttpMethod::Put, endpoint, Some(body), Some(headers))
    }

    pub fn delete(&self, endpoint: &str) -> Result<ApiResponse, TransportError> {
        self.send(HttpMethod::Delete, endpoint, None, None)
    }

    pub fn delete_with(&self, endpoint: &str, headers: &Headers) -> Result<ApiResponse, TransportError> {
        self.send(HttpMethod::Delete, endpoint, None, Some(headers))
    }

    /// Build the request for one call without sending it.
    ///
    /// GET and DELETE never carry a body; POST and PUT always do, empty if
    /// none was given, with `Content-Type: application/json` unless the
    /// effective headers already name a content type.
    pub fn build_request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<&str>,
        headers: Option<&Headers>,
    ) -> HttpRequest {
        let mut merged = self.config.default_headers();
        if let Some(extra) = headers {
            for name in extra.keys() {
                if let Some(default) = merged
                    .keys()
                    .find(|d| *d != name && d.eq_ignore_ascii_case(name))
                {
                    tracing::warn!(
                        header = %name,
                        default = %default,
                        "caller header differs from a default only by case, both will be sent"
                    );
                }
            }
            merged.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        let mut headers: Vec<(String, String)> = merged.into_iter().collect();

        let body = if method.has_body() {
            if !headers.iter().any(|(k, _)| k.eq_ignore_ascii_case("content-type")) {
                headers.push(("Content-Type".to_string(), "application/json".to_string()));
            }
            Some(body.unwrap_or_default().to_string())
        } else {
            None
        };
        headers.sort();

        HttpRequest {
            method,
            url: format!("{}{endpoint}", self.config.base_url()),
            headers,
            body,
        }
    }

    /// Execute one call and normalize the result.
    pub fn send(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<&str>,
        headers: Option<&Headers>,
    ) -> Result<ApiResponse, TransportError> {
        let request = self.build_request(method, endpoint, body, headers);
        let span = tracing::info_span!("api_call", request_id = %Uuid::new_v4());
        let _enter = span.enter();

        match &request.body {
            Some(body) => tracing::info!(%method, url = %request.url, body = %body, "sending request"),
            None => tracing::info!(%method, url = %request.url, "sending request"),
        }

        let response = self.transport.execute(&request).map_err(|e| {
            tracing::warn!(%method, url = %request.url, error = %e, "request failed");
            e
        })?;

        tracing::info!(
            %method,
            status = response.status,
            body = %preview(&response.body, self.preview_length),
            "received response"
        );

        Ok(ApiResponse::new(response.status, response.body))
    }

    /// Release the transport. Safe to call more than once; later requests
    /// fail with `TransportError::Closed`.
    pub fn close(&mut self) {
        self.transport.close();
    }
}
