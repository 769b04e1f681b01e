//! Authenticated session shared by every request the SFS client issues.
//!
//! Token issuance and AK/SK request signing happen elsewhere; a session
//! simply binds a pre-issued token to an endpoint and project and owns the
//! HTTP connection pool.

use std::fmt;
use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Credentials attached to every API request.
#[derive(Clone, Eq, PartialEq)]
pub struct Credentials {
    auth_token: String,
}

impl Credentials {
    /// Wraps a pre-issued `X-Auth-Token` value.
    #[must_use]
    pub fn new(auth_token: impl Into<String>) -> Self {
        Self {
            auth_token: auth_token.into().trim().to_owned(),
        }
    }

    pub(crate) const fn auth_token(&self) -> &str {
        self.auth_token.as_str()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("auth_token", &"<redacted>")
            .finish()
    }
}

/// Errors raised while establishing a session.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum SessionError {
    /// Raised when the endpoint is not an absolute HTTP(S) URL.
    #[error("invalid endpoint '{endpoint}': {message}")]
    InvalidEndpoint {
        /// Endpoint as supplied.
        endpoint: String,
        /// Reason the endpoint was rejected.
        message: String,
    },
    /// Raised when the auth token is blank.
    #[error("missing credentials: an auth token is required")]
    MissingCredentials,
    /// Raised when the project identifier is blank.
    #[error("missing project identifier")]
    MissingProject,
    /// Raised when the HTTP client cannot be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// Ready-to-use client handle bound to one endpoint and project.
///
/// Cloning is cheap and clones share the connection pool.
#[derive(Clone, Debug)]
pub struct Session {
    http: reqwest::Client,
    endpoint: Url,
    project_id: String,
    credentials: Credentials,
}

impl Session {
    /// Establishes a session with the default request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the endpoint is malformed, the project or
    /// token is blank, or the HTTP client cannot be built.
    pub fn new(
        endpoint: &str,
        project_id: &str,
        credentials: Credentials,
    ) -> Result<Self, SessionError> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|err| SessionError::Client(err.to_string()))?;
        Self::with_http_client(endpoint, project_id, credentials, http)
    }

    /// Establishes a session around a caller supplied HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the endpoint is malformed or the project
    /// or token is blank.
    pub fn with_http_client(
        endpoint: &str,
        project_id: &str,
        credentials: Credentials,
        http: reqwest::Client,
    ) -> Result<Self, SessionError> {
        let parsed = parse_endpoint(endpoint)?;
        if project_id.trim().is_empty() {
            return Err(SessionError::MissingProject);
        }
        if credentials.auth_token().is_empty() {
            return Err(SessionError::MissingCredentials);
        }
        Ok(Self {
            http,
            endpoint: parsed,
            project_id: project_id.trim().to_owned(),
            credentials,
        })
    }

    /// Returns the endpoint the session talks to.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Returns the project the session is scoped to.
    #[must_use]
    pub const fn project_id(&self) -> &str {
        self.project_id.as_str()
    }

    pub(crate) const fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) const fn auth_token(&self) -> &str {
        self.credentials.auth_token()
    }

    /// URL of the project's share collection followed by `segments`, each
    /// percent-encoded as a single path segment.
    pub(crate) fn shares_url(&self, segments: &[&str]) -> Url {
        let mut url = self.endpoint.clone();
        // `parse_endpoint` only admits http(s) URLs with a host, which always
        // carry a hierarchical path.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .extend(["v2", self.project_id.as_str(), "shares"])
                .extend(segments);
        }
        url
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url, SessionError> {
    let invalid = |message: &str| SessionError::InvalidEndpoint {
        endpoint: endpoint.to_owned(),
        message: message.to_owned(),
    };
    let parsed = Url::parse(endpoint.trim()).map_err(|err| invalid(&err.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if parsed.host_str().is_none() {
        return Err(invalid("a host is required"));
    }
    Ok(parsed)
}
