//! reqwest-backed transport

use std::future::Future;

use crate::error::{AgentError, Result};
use crate::transport::server::ServerConfig;
use crate::transport::{ApiRequest, ApiResponse, Method, Transport};

use super::headers::{USER_AGENT, request_headers};

/// HTTPS transport for one platform node
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    server: ServerConfig,
}

impl HttpTransport {
    /// Create a transport for `server`
    ///
    /// # Errors
    /// Returns `AgentError::InvalidConfig` if the HTTP client cannot be built
    pub fn new(server: ServerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(server.request_timeout)
            .danger_accept_invalid_certs(server.ignore_certificate)
            .build()
            .map_err(|e| AgentError::invalid_config(format!("cannot build HTTP client: {e}")))?;
        Ok(Self { client, server })
    }

    /// Server this transport talks to
    #[must_use]
    pub fn server(&self) -> &ServerConfig {
        &self.server
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: ApiRequest) -> impl Future<Output = Result<ApiResponse>> + Send {
        async move {
            let url = self.server.url(&request.path);
            log::trace!("[{}] {} {}", request.id, request.method, url);

            let method = match request.method {
                Method::Get => reqwest::Method::GET,
                Method::Put => reqwest::Method::PUT,
            };
            let mut builder = self
                .client
                .request(method, &url)
                .headers(request_headers(&request)?);
            if let Some(credentials) = &request.credentials {
                builder = builder.basic_auth(&credentials.username, Some(&credentials.password));
            }
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await.map_err(|e| {
                log::error!("[{}] request to {} failed: {}", request.id, url, e);
                AgentError::request_failed(format!("{} {url}: {e}", request.method))
            })?;
            let status = response.status().as_u16();
            let body = response.text().await.map_err(|e| {
                AgentError::request_failed(format!("cannot read response body: {e}"))
            })?;
            log::trace!("[{}] response status {}", request.id, status);
            Ok(ApiResponse::new(status, body))
        }
    }
}
