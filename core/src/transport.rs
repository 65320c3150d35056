//! The network step: `HttpRequest` in, `HttpResponse` out.

use std::io;
use std::time::Duration;

use ureq::{Agent, RequestBuilder};

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes one request and reads the full response.
///
/// Implementations must hand back 4xx/5xx responses as `Ok`; only failures
/// to complete the exchange are errors.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;

    /// Release pooled resources. Later `execute` calls fail with
    /// `TransportError::Closed`. Calling it again is a no-op.
    fn close(&mut self) {}
}

/// Blocking transport backed by a pooled `ureq` agent.
#[derive(Debug)]
pub struct UreqTransport {
    agent: Option<Agent>,
}

impl UreqTransport {
    /// `timeout` bounds both waiting for the response head and reading the
    /// body. `None` waits indefinitely.
    pub fn new(timeout: Option<Duration>) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_recv_response(timeout)
            .timeout_recv_body(timeout)
            .build()
            .new_agent();
        Self { agent: Some(agent) }
    }

    pub fn is_closed(&self) -> bool {
        self.agent.is_none()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let agent = self.agent.as_ref().ok_or(TransportError::Closed)?;
        let url = request.url.as_str();
        let body = request.body.as_deref().unwrap_or_default();

        let result = match request.method {
            HttpMethod::Get => with_headers(agent.get(url), &request.headers).call(),
            HttpMethod::Delete => with_headers(agent.delete(url), &request.headers).call(),
            HttpMethod::Post => with_headers(agent.post(url), &request.headers).send(body.as_bytes()),
            HttpMethod::Put => with_headers(agent.put(url), &request.headers).send(body.as_bytes()),
        };
        let mut response = result.map_err(|e| classify(request, e))?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_string()
            .map_err(|e| classify(request, e))?;

        Ok(HttpResponse { status, body })
    }

    fn close(&mut self) {
        if self.agent.take().is_some() {
            tracing::debug!("transport closed");
        }
    }
}

fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn classify(request: &HttpRequest, err: ureq::Error) -> TransportError {
    let method = request.method.as_str();
    let url = request.url.clone();
    match err {
        ureq::Error::Timeout(which) => TransportError::Timeout {
            method,
            url,
            detail: which.to_string(),
        },
        ureq::Error::Io(source) if source.kind() == io::ErrorKind::TimedOut => {
            TransportError::Timeout {
                method,
                url,
                detail: source.to_string(),
            }
        }
        ureq::Error::Io(source) => TransportError::Io {
            method,
            url,
            source,
        },
        other => TransportError::Request {
            method,
            url,
            message: other.to_string(),
        },
    }
}
