use async_trait::async_trait;

use crate::error::BoxError;

/// HTTP methods the analyzer issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// An outbound request handed to a [`Transport`].
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: Vec::new(),
            body: Some(body),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Status, headers and body of a completed exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Case-insensitive header lookup; the first match wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// The "send a request, get status and body" capability the analyzer is built on.
///
/// Implementations make exactly one attempt per call. Any failure to complete the exchange
/// is returned as an error; a non-2xx status is a successful exchange.
///
/// # Examples
///
/// A canned transport for tests:
///
/// ```
/// use async_trait::async_trait;
/// use image_analyzer::{BoxError, HttpRequest, HttpResponse, Transport};
///
/// struct Canned(u16, &'static str);
///
/// #[async_trait]
/// impl Transport for Canned {
///     async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, BoxError> {
///         Ok(HttpResponse::new(self.0, self.1))
///     }
/// }
/// ```
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, BoxError>;
}

#[cfg(feature = "reqwest-transport")]
pub use self::reqwest_transport::ReqwestTransport;

#[cfg(feature = "reqwest-transport")]
mod reqwest_transport {
    use async_trait::async_trait;
    use std::time::Duration;
    use tracing::{debug, error, warn};

    use super::{HttpRequest, HttpResponse, Method, Transport};
    use crate::error::BoxError;

    /// [`Transport`] backed by a `reqwest::Client`.
    #[derive(Debug, Clone, Default)]
    pub struct ReqwestTransport {
        client: reqwest::Client,
    }

    impl ReqwestTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Wrap an already configured client.
        pub fn from_client(client: reqwest::Client) -> Self {
            Self { client }
        }

        /// Rebuild the underlying client with a timeout covering the entire request.
        #[tracing::instrument(skip(self))]
        pub fn with_timeout(mut self, timeout: Duration) -> Self {
            self.client = reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|e| {
                    warn!(
                        error = %e,
                        "Failed to build reqwest client with timeout, using default"
                    );
                    reqwest::Client::new()
                });
            self
        }
    }

    #[async_trait]
    impl Transport for ReqwestTransport {
        async fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, BoxError> {
            let mut builder = match request.method {
                Method::Get => self.client.get(&request.url),
                Method::Post => self.client.post(&request.url),
            };
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await.map_err(|e| {
                error!(error = %e, timeout = e.is_timeout(), "HTTP request failed");
                e
            })?;

            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_string(), v.to_string()))
                })
                .collect();
            let body = response.bytes().await?.to_vec();
            debug!(status, body_len = body.len(), "Received HTTP response");

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }
}
