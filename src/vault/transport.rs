//! Authenticated HTTP transport for a Vault backend.
//!
//! Every request carries the configured host override and token headers.
//! Vault answers `307 Temporary Redirect` while an HA standby forwards
//! clients to the active member, so the transport re-issues the request
//! against the absolute `Location` target, at most [`MAX_REDIRECTS`] times.
//!
//! # Replayable bodies
//!
//! A request body is buffered into [`Bytes`] before the first attempt and
//! the same bytes are resubmitted verbatim on every hop. Callers hand over
//! a fully materialized body; streaming bodies are not accepted. Alternate
//! transports must keep this contract or redirects will lose the payload.

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, HOST, LOCATION};
use reqwest::redirect::Policy;
use reqwest::{Client, Method, StatusCode};
use tracing::{debug, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::errors::{Result, SafeError};

/// Upper bound on consecutive redirect hops for one request
pub const MAX_REDIRECTS: usize = 10;

/// Header carrying the bearer token
pub const TOKEN_HEADER: &str = "x-vault-token";

const DUMP_RULE: &str = "----------------";

/// Fully buffered backend response
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TransportResponse {
    /// Status line text, e.g. "404 Not Found"
    pub fn status_text(&self) -> String {
        self.status.to_string()
    }

    /// Body decoded as UTF-8, lossily
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// A request whose body has been read once and retained for replay
#[derive(Debug, Clone)]
struct ReplayableRequest {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Bytes>,
}

/// HTTP transport bound to one backend address
///
/// Holds no per-request state; coordinated member interactions should
/// still each get their own instance so credentials and addresses never
/// leak between members.
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
    config: ClientConfig,
}

impl Transport {
    /// Create a transport for the configured address
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .redirect(Policy::none())
            .danger_accept_invalid_certs(config.skip_verify)
            .build()?;

        Ok(Self { client, config })
    }

    /// Base address of the backend
    pub fn address(&self) -> &str {
        &self.config.address
    }

    /// Settings this transport was built from
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Absolute URL for an API path below `/v1/`
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/v1/{}",
            self.config.address.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Issue a request against an API path below `/v1/`
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Bytes>,
    ) -> Result<TransportResponse> {
        let url = self.url(path);
        self.send(method, &url, body).await
    }

    /// Issue a request against an absolute URL, following 307 redirects
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<Bytes>,
    ) -> Result<TransportResponse> {
        let url = Url::parse(url).map_err(|e| SafeError::invalid_url(url, e))?;
        let mut request =
            ReplayableRequest { method, url, headers: self.default_headers()?, body };

        for hop in 0..MAX_REDIRECTS {
            let response = self.dispatch(&request).await?;

            if response.status != StatusCode::TEMPORARY_REDIRECT {
                return Ok(response);
            }

            let location = response
                .headers
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| SafeError::malformed("307 response without a Location header"))?;
            // Only absolute Location values are supported
            request.url = Url::parse(location).map_err(|_| {
                SafeError::malformed(format!("unsupported redirect location '{}'", location))
            })?;

            debug!(hop = hop + 1, location = %request.url, "following redirect");
        }

        warn!(url = %request.url, "giving up after {} redirects", MAX_REDIRECTS);
        Err(SafeError::RedirectLoop)
    }

    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        if let Some(host) = self.config.host_override.as_deref() {
            let value = HeaderValue::from_str(host)
                .map_err(|_| SafeError::config(format!("invalid host override '{}'", host)))?;
            headers.insert(HOST, value);
        }

        if let Some(token) = self.config.token.as_deref() {
            let mut value = HeaderValue::from_str(token)
                .map_err(|_| SafeError::config("token contains invalid header characters"))?;
            value.set_sensitive(true);
            headers.insert(HeaderName::from_static(TOKEN_HEADER), value);
        }

        Ok(headers)
    }

    async fn dispatch(&self, request: &ReplayableRequest) -> Result<TransportResponse> {
        debug!(method = %request.method, url = %request.url, "sending request");

        if self.config.trace {
            eprint!("{}", dump_request(request));
        }

        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        let response = TransportResponse { status, headers, body };

        debug!(status = %response.status, "received response");

        if self.config.trace {
            eprint!("{}", dump_response(&response));
        }

        Ok(response)
    }
}

fn dump_headers(out: &mut String, headers: &HeaderMap) {
    for (name, value) in headers {
        out.push_str(&format!("{}: {}\n", name, String::from_utf8_lossy(value.as_bytes())));
    }
}

fn dump_request(request: &ReplayableRequest) -> String {
    let target = match request.url.query() {
        Some(query) => format!("{}?{}", request.url.path(), query),
        None => request.url.path().to_string(),
    };

    let mut out = String::from("Request:\n");
    out.push_str(&format!("{} {} HTTP/1.1\n", request.method, target));
    if !request.headers.contains_key(HOST) {
        if let Some(host) = request.url.host_str() {
            match request.url.port() {
                Some(port) => out.push_str(&format!("host: {}:{}\n", host, port)),
                None => out.push_str(&format!("host: {}\n", host)),
            }
        }
    }
    dump_headers(&mut out, &request.headers);
    out.push('\n');
    if let Some(body) = &request.body {
        out.push_str(&String::from_utf8_lossy(body));
    }
    out.push_str(&format!("\n{}\n", DUMP_RULE));
    out
}

fn dump_response(response: &TransportResponse) -> String {
    let mut out = String::from("Response:\n");
    out.push_str(&format!("HTTP/1.1 {}\n", response.status));
    dump_headers(&mut out, &response.headers);
    out.push('\n');
    out.push_str(&String::from_utf8_lossy(&response.body));
    out.push_str(&format!("\n{}\n", DUMP_RULE));
    out
}
