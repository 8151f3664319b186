use crate::config::Config;
use crate::error::{Result, TrackerError};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use std::fmt;
use std::time::Duration;

pub const TOKEN_HEADER: &str = "X-TrackerToken";

// ---------------------------------------------------------------------------
// Request / Response
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    /// XML payload; `None` sends an empty body.
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    /// Map any non-2xx status to [`TrackerError::ServiceRejected`].
    pub fn ensure_success(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(TrackerError::ServiceRejected {
                status: self.status,
                body: self.body,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// One blocking round-trip to the tracking service.
///
/// Implementations return every HTTP response, whatever its status, and
/// fail only when no response was received.
pub trait Transport {
    fn send(&self, request: Request) -> Result<Response>;
}

/// [`Transport`] over a blocking `reqwest` client. No retries.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    token: String,
}

impl HttpTransport {
    pub fn new(token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TrackerError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            token: token.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.token.clone(), config.timeout)
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: Request) -> Result<Response> {
        tracing::debug!(method = %request.method, url = %request.url, "sending request");

        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Put => self.client.put(&request.url),
            Method::Post => self.client.post(&request.url),
        }
        .header(TOKEN_HEADER, &self.token);

        builder = match request.body {
            Some(body) => builder.header(CONTENT_TYPE, "application/xml").body(body),
            None if request.method != Method::Get => builder.header(CONTENT_LENGTH, "0"),
            None => builder,
        };

        let response = builder
            .send()
            .map_err(|e| TrackerError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| TrackerError::Transport(e.to_string()))?;

        tracing::debug!(status, "received response");
        Ok(Response { status, body })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
