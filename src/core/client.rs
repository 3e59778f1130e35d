//! HTTP client wrapper shared by every translation engine

use async_trait::async_trait;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslationError};

/// Characters left as-is when quoting a query value
const QUERY_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~');

/// Same as [`QUERY_SAFE`] but keeps path separators
const PATH_SAFE: &AsciiSet = &QUERY_SAFE.remove(b'/');

/// Longest error body echoed back in an [`TranslationError::ApiError`]
const MAX_ERROR_BODY: usize = 256;

/// Percent-encode `text`; `plus` encodes spaces as `+` instead of `%20`
pub fn url_encode(text: &str, plus: bool) -> String {
    if plus {
        utf8_percent_encode(text, QUERY_SAFE)
            .to_string()
            .replace("%20", "+")
    } else {
        utf8_percent_encode(text, PATH_SAFE).to_string()
    }
}

/// Reverse of [`url_encode`]
pub fn url_decode(text: &str, plus: bool) -> String {
    if plus {
        let spaced = text.replace('+', " ");
        percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
    } else {
        percent_decode_str(text).decode_utf8_lossy().into_owned()
    }
}

/// HTTP method used by the engines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
}

/// One outbound request, before configuration is applied
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// Request method
    pub method: Method,
    /// Absolute URL without the data parameters
    pub url: String,
    /// Query parameters for GET, form fields for POST
    pub data: Vec<(String, String)>,
    /// Header pairs, matched case-insensitively
    pub headers: Vec<(String, String)>,
    /// Timeout applied by the client
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// GET request to `url`
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    /// POST request to `url`
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            data: Vec::new(),
            headers: Vec::new(),
            timeout: None,
        }
    }

    /// Append data pairs
    pub fn with_data<K, V>(mut self, data: &[(K, V)]) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.data.extend(
            data.iter()
                .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string())),
        );
        self
    }

    /// Append a header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set a header, replacing any existing one with the same name
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.into()));
    }

    /// Value of the first header called `name`
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Response with the body fully read
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Final URL after redirects
    pub url: String,
    /// Body decoded as UTF-8
    pub body: String,
}

impl HttpResponse {
    /// Response from its parts
    pub fn new(status: u16, url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status,
            url: url.into(),
            body: body.into(),
        }
    }

    /// Body as text
    pub fn text(&self) -> &str {
        &self.body
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|e| {
            TranslationError::parse(format!("invalid JSON from {}: {}", self.url, e))
        })
    }
}

/// Something that can carry an [`HttpRequest`] to a server
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Reusable connection pool backed by `reqwest`
#[derive(Debug, Clone)]
pub struct Session {
    client: reqwest::Client,
}

impl Session {
    /// Create the connection pool, applying the configured proxy to every scheme
    pub fn new(config: &TranslatorConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .pool_idle_timeout(Some(Duration::from_secs(30)))
            .pool_max_idle_per_host(4);

        // Without an explicit proxy reqwest falls back to HTTP_PROXY/HTTPS_PROXY
        if let Some(proxy) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy.as_str()).map_err(|e| {
                TranslationError::config(format!("invalid proxy {:?}: {}", proxy, e))
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| TranslationError::config(format!("cannot create HTTP session: {}", e)))?;

        Ok(Self { client })
    }

    /// Turn an [`HttpRequest`] into a ready-to-send `reqwest` request
    pub fn build_request(&self, request: &HttpRequest) -> Result<reqwest::Request> {
        let url = reqwest::Url::parse(&request.url).map_err(|e| {
            TranslationError::config(format!("invalid URL {:?}: {}", request.url, e))
        })?;

        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        if !request.data.is_empty() {
            builder = match request.method {
                Method::Get => builder.query(&request.data),
                Method::Post => builder.form(&request.data),
            };
        }

        Ok(builder.build()?)
    }
}

#[async_trait]
impl Transport for Session {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let request = self.build_request(&request)?;
        debug!("{} {}", request.method(), request.url());

        let response = self.client.execute(request).await?;
        let status = response.status();
        let url = response.url().to_string();
        let body = response.text().await?;

        if !status.is_success() {
            let mut message = body;
            if message.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !message.is_char_boundary(cut) {
                    cut -= 1;
                }
                message.truncate(cut);
            }
            return Err(TranslationError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(HttpResponse {
            status: status.as_u16(),
            url,
            body,
        })
    }
}

/// HTTP helper owned by one engine: merges configuration into every request
#[derive(Clone)]
pub struct HttpClient {
    transport: Arc<dyn Transport>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
}

impl HttpClient {
    /// Create a client with its own [`Session`]
    pub fn new(config: &TranslatorConfig) -> Result<Self> {
        config.validate()?;
        let session = Session::new(config)?;
        Ok(Self::with_transport(Arc::new(session), config))
    }

    /// Create a client on top of an existing transport
    pub fn with_transport(transport: Arc<dyn Transport>, config: &TranslatorConfig) -> Self {
        Self {
            transport,
            user_agent: config.user_agent.clone(),
            timeout: config.request_timeout(),
        }
    }

    /// Use `agent` unless the configuration already picked one
    pub fn with_default_user_agent(mut self, agent: impl Into<String>) -> Self {
        if self.user_agent.is_none() {
            self.user_agent = Some(agent.into());
        }
        self
    }

    /// User-Agent sent with every request
    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    /// Per-request timeout, `None` when disabled
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Apply User-Agent and timeout to a request
    pub fn prepare(&self, mut request: HttpRequest) -> HttpRequest {
        if let Some(agent) = &self.user_agent {
            request.set_header("User-Agent", agent.clone());
        }
        request.timeout = self.timeout;
        request
    }

    /// Send a request through the transport
    pub async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let request = self.prepare(request);
        self.transport.execute(request).await
    }

    /// Issue one request; `data` goes to the query string for GET and the body for POST
    pub async fn request(
        &self,
        url: &str,
        data: Option<&[(&str, &str)]>,
        post: bool,
        headers: Option<&[(&str, &str)]>,
    ) -> Result<HttpResponse> {
        let mut request = if post {
            HttpRequest::post(url)
        } else {
            HttpRequest::get(url)
        };

        if let Some(data) = data {
            request = request.with_data(data);
        }

        for (name, value) in headers.unwrap_or_default() {
            request = request.with_header(*name, *value);
        }

        self.send(request).await
    }

    /// GET with `data` as query parameters
    pub async fn get(
        &self,
        url: &str,
        data: Option<&[(&str, &str)]>,
        headers: Option<&[(&str, &str)]>,
    ) -> Result<HttpResponse> {
        self.request(url, data, false, headers).await
    }

    /// POST with `data` as a form body
    pub async fn post(
        &self,
        url: &str,
        data: Option<&[(&str, &str)]>,
        headers: Option<&[(&str, &str)]>,
    ) -> Result<HttpResponse> {
        self.request(url, data, true, headers).await
    }
}
