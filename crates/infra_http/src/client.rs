//! Backend client
//!
//! A thin wrapper around one `reqwest::Client` with a cookie store. The
//! backend authenticates every call through the `access_token` cookie set at
//! sign-in; the client never reads it.
//!
//! Every response with status 401 is broadcast as
//! [`SessionEvent::LoginRequired`] before the error is returned, so the
//! application shell can navigate to the login page no matter which adapter
//! made the call.

use core_kernel::PortError;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::error::{status_to_port_error, transport_to_port_error, HttpError};

/// Query for endpoints that take no parameters
pub const NO_QUERY: [(&str, &str); 0] = [];

/// Connection settings for the backend
///
/// ```rust
/// use infra_http::HttpConfig;
/// use std::time::Duration;
///
/// let config = HttpConfig::new("http://localhost:8002")
///     .request_timeout(Duration::from_secs(10))
///     .bulk_timeout(Duration::from_secs(90));
/// assert_eq!(config.bulk_timeout, Duration::from_secs(90));
/// ```
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Backend root, e.g. `http://localhost:8002`
    pub base_url: String,
    /// Timeout for ordinary calls
    pub request_timeout: Duration,
    /// Timeout for bulk upserts, which touch many rows
    pub bulk_timeout: Duration,
}

impl HttpConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: Duration::from_secs(30),
            bulk_timeout: Duration::from_secs(60),
        }
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn bulk_timeout(mut self, timeout: Duration) -> Self {
        self.bulk_timeout = timeout;
        self
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::new("http://localhost:8002")
    }
}

/// Session-wide events raised by the HTTP layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A call came back 401; the operator must sign in again
    LoginRequired { path: String },
    SignedIn { username: String },
    SignedOut,
}

/// A downloaded file
#[derive(Debug, Clone)]
pub struct Download {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    pub filename: Option<String>,
}

/// Shared backend client; cheap to clone
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: HttpConfig,
    events: broadcast::Sender<SessionEvent>,
}

impl ApiClient {
    pub fn new(config: HttpConfig) -> Result<Self, HttpError> {
        if !(config.base_url.starts_with("http://") || config.base_url.starts_with("https://")) {
            return Err(HttpError::InvalidBaseUrl(config.base_url));
        }
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.request_timeout)
            .build()?;
        let (events, _) = broadcast::channel(16);
        info!(base_url = %config.base_url, "Backend client ready");
        Ok(Self { http, config, events })
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Subscribes to session events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Signs in; the backend answers with the session cookie
    pub async fn login(&self, username: &str, password: &str) -> Result<(), PortError> {
        let request = self
            .http
            .post(self.url("/token"))
            .form(&[("username", username), ("password", password)]);
        self.execute("login", "/token", request, self.config.request_timeout).await?;
        info!(username, "Signed in");
        let _ = self.events.send(SessionEvent::SignedIn {
            username: username.to_string(),
        });
        Ok(())
    }

    pub async fn logout(&self) -> Result<(), PortError> {
        let request = self.http.post(self.url("/auth/logout"));
        self.execute("logout", "/auth/logout", request, self.config.request_timeout).await?;
        let _ = self.events.send(SessionEvent::SignedOut);
        Ok(())
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    /// Sends a request and maps every non-success status to a `PortError`
    pub(crate) async fn execute(
        &self,
        operation: &str,
        path: &str,
        request: RequestBuilder,
        timeout: Duration,
    ) -> Result<Response, PortError> {
        let response = request
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                warn!(operation, path, error = %e, "Backend call failed");
                transport_to_port_error(e, operation, timeout)
            })?;

        let status = response.status();
        debug!(operation, path, status = status.as_u16(), "Backend responded");
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            warn!(operation, path, "Session expired");
            let _ = self.events.send(SessionEvent::LoginRequired {
                path: path.to_string(),
            });
        }
        let body = response.text().await.unwrap_or_default();
        Err(status_to_port_error(status, path, &body))
    }

    pub(crate) async fn get_json<T, Q>(&self, operation: &str, path: &str, query: &Q) -> Result<T, PortError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let request = self.request(Method::GET, path).query(query);
        let response = self.execute(operation, path, request, self.config.request_timeout).await?;
        decode(response).await
    }

    pub(crate) async fn send_json<B, T>(
        &self,
        operation: &str,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, PortError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json_within(operation, method, path, body, self.config.request_timeout).await
    }

    pub(crate) async fn send_json_within<B, T>(
        &self,
        operation: &str,
        method: Method,
        path: &str,
        body: &B,
        timeout: Duration,
    ) -> Result<T, PortError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(method, path).json(body);
        let response = self.execute(operation, path, request, timeout).await?;
        decode(response).await
    }

    /// Sends a body-less request and discards the response body
    pub(crate) async fn send_empty(&self, operation: &str, method: Method, path: &str) -> Result<(), PortError> {
        let request = self.request(method, path);
        self.execute(operation, path, request, self.config.request_timeout).await?;
        Ok(())
    }

    pub(crate) async fn download<Q>(&self, operation: &str, path: &str, query: &Q) -> Result<Download, PortError>
    where
        Q: Serialize + ?Sized,
    {
        let request = self.request(Method::GET, path).query(query);
        let response = self.execute(operation, path, request, self.config.request_timeout).await?;
        let content_type = header_text(&response, CONTENT_TYPE.as_str());
        let filename = header_text(&response, CONTENT_DISPOSITION.as_str()).and_then(|v| attachment_filename(&v));
        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_to_port_error(e, operation, self.config.request_timeout))?;
        Ok(Download {
            bytes: bytes.to_vec(),
            content_type,
            filename,
        })
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, PortError> {
    let text = response.text().await.map_err(|e| PortError::Transformation {
        message: e.to_string(),
    })?;
    serde_json::from_str(&text).map_err(|e| PortError::Transformation {
        message: format!("unexpected response body: {}", e),
    })
}

fn header_text(response: &Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Filename from a `Content-Disposition: attachment; filename="x.xlsx"` header
pub fn attachment_filename(header: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = ApiClient::new(HttpConfig::new("http://localhost:8002/")).unwrap();
        assert_eq!(client.url("/hoa-don/"), "http://localhost:8002/hoa-don/");
    }

    #[test]
    fn test_rejects_base_url_without_scheme() {
        assert!(matches!(
            ApiClient::new(HttpConfig::new("localhost:8002")),
            Err(HttpError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn test_attachment_filename() {
        assert_eq!(
            attachment_filename(r#"attachment; filename="hoa-don.xlsx""#).as_deref(),
            Some("hoa-don.xlsx")
        );
        assert_eq!(attachment_filename("inline"), None);
    }
}
