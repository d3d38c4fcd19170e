//! Transport layer for the platform's request/response API
//!
//! This module provides the transport abstraction the session engine talks
//! through, the request/response values exchanged over it, the server
//! configuration, and (behind the `http` feature) a reqwest implementation.

#[cfg(feature = "http")]
pub mod http;
pub mod server;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::error::Result;
use crate::types::identifiers::RequestId;

pub use server::ServerConfig;

#[cfg(feature = "http")]
pub use http::HttpTransport;

// ============================================================================
// Request / Response
// ============================================================================

/// HTTP method used by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Read a resource
    Get,
    /// Replace a resource (state changes)
    Put,
}

impl Method {
    /// Method name on the wire
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Basic credentials sent with a request
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// User name
    pub username: String,
    /// Password
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

/// One API request
///
/// `path` is relative to the API root (`/finesse/api`), e.g. `/User/1001001`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// Correlation id, unique per request
    pub id: RequestId,
    /// Method
    pub method: Method,
    /// Path below the API root
    pub path: String,
    /// XML body for state changes
    pub body: Option<String>,
    /// Credentials for basic auth
    pub credentials: Option<Credentials>,
}

impl ApiRequest {
    /// `GET /User/{user}`
    pub fn get_user(user: impl AsRef<str>) -> Self {
        Self {
            id: RequestId::generate(),
            method: Method::Get,
            path: user_path(user.as_ref()),
            body: None,
            credentials: None,
        }
    }

    /// `PUT /User/{user}` with an XML body
    pub fn put_user(user: impl AsRef<str>, body: impl Into<String>) -> Self {
        Self {
            id: RequestId::generate(),
            method: Method::Put,
            path: user_path(user.as_ref()),
            body: Some(body.into()),
            credentials: None,
        }
    }

    /// Attach basic credentials
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some(Credentials {
            username: username.into(),
            password: password.into(),
        });
        self
    }
}

fn user_path(user: &str) -> String {
    format!("/User/{user}")
}

/// Raw API response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// Status code
    pub status: u16,
    /// Raw body
    pub body: String,
}

impl ApiResponse {
    /// Create a response
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Short text for error reports: the body if there is one, else the status
    #[must_use]
    pub fn error_text(&self) -> String {
        let body = self.body.trim();
        if body.is_empty() {
            format!("status {}", self.status)
        } else {
            body.chars().take(512).collect()
        }
    }
}

// ============================================================================
// Transport Trait
// ============================================================================

/// Request/response channel to the platform
///
/// An `Err` means the request never produced a response (connect, send or
/// body read failure). Any response, including non-2xx, is `Ok`.
pub trait Transport: Send + Sync + 'static {
    /// Execute one request
    ///
    /// # Errors
    /// Returns `AgentError::RequestFailed` if no response was received
    fn execute(&self, request: ApiRequest)
    -> impl Future<Output = Result<ApiResponse>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn execute(
        &self,
        request: ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse>> + Send {
        (**self).execute(request)
    }
}
