//! Shared HTTP plumbing for the Fintrack API
//!
//! Every request carries the session credentials: cookies set by the server
//! are kept in the client's jar, and a session cookie from configuration (if
//! any) is sent on every request. Responses are mapped onto the core error
//! type: 401/403 become `Unauthorized`, other non-2xx statuses `Http`, and
//! bodies that do not match the expected shape `Decode`.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, COOKIE};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::domain::result::{Error, Result};

/// Connection settings for [`ApiClient`]
#[derive(Debug, Clone, Default)]
pub struct ApiClientOptions {
    /// Raw `Cookie` header value, e.g. `connect.sid=...`
    pub session_cookie: Option<String>,
    /// Per-request timeout; `None` leaves it to the network stack
    pub timeout: Option<Duration>,
}

/// Response envelope used by the finance endpoints
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    status: String,
    data: T,
}

impl<T> Envelope<T> {
    pub(crate) fn into_data(self) -> Result<T> {
        if self.status != "success" {
            return Err(Error::decode(format!(
                "expected status \"success\", got \"{}\"",
                self.status
            )));
        }
        Ok(self.data)
    }
}

/// Thin wrapper over a configured `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client for the API rooted at `server_url`
    pub fn new(server_url: &str, options: ApiClientOptions) -> Result<Self> {
        let base_url = Url::parse(server_url)
            .map_err(|e| Error::Config(format!("Invalid server URL '{}': {}", server_url, e)))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "Server URL must be an http(s) URL: {}",
                server_url
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(cookie) = options.session_cookie.as_deref().filter(|c| !c.is_empty()) {
            let value = HeaderValue::from_str(cookie)
                .map_err(|_| Error::Config("Session cookie contains invalid characters".into()))?;
            headers.insert(COOKIE, value);
        }

        let mut builder = Client::builder()
            .cookie_store(true)
            .default_headers(headers);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for `segments` under the base path, each segment encoded
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("Server URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = self.endpoint(segments)?;
        debug!(%method, %url, "api request");
        Ok(self.client.request(method, url))
    }

    /// Send and decode a JSON body of type `T`
    pub(crate) async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let response = check_status(response)?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| Error::decode(e.to_string()))
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        self.send(self.request(Method::GET, segments)?).await
    }

    pub(crate) async fn get_with_query<T, Q>(&self, segments: &[&str], query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send(self.request(Method::GET, segments)?.query(query)).await
    }

    pub(crate) async fn send_json<T, B>(&self, method: Method, segments: &[&str], body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(self.request(method, segments)?.json(body)).await
    }
}

fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    debug!(status = status.as_u16(), url = %response.url(), "api request rejected");
    match status.as_u16() {
        401 | 403 => Err(Error::Unauthorized),
        code => Err(Error::Http { status: code }),
    }
}
