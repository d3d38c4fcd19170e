//! Platform server configuration

use std::net::Ipv4Addr;
use std::time::Duration;

use crate::error::{AgentError, Result};

/// Default HTTPS API port
pub const DEFAULT_API_PORT: u16 = 8445;

/// Default push (websocket) port
pub const DEFAULT_PUSH_PORT: u16 = 7443;

/// Default plain push port, used when secure push is disabled
pub const DEFAULT_INSECURE_PUSH_PORT: u16 = 5222;

/// Default request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// API root path
pub const API_ROOT: &str = "/finesse/api";

/// Connection settings for one platform node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host name, FQDN or IPv4 address
    pub host: String,
    /// HTTPS API port
    pub port: u16,
    /// Accept invalid certificates
    pub ignore_certificate: bool,
    /// Push port
    pub push_port: u16,
    /// Use the plain push transport instead of secure websockets
    pub insecure_push: bool,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl ServerConfig {
    /// Configuration with default ports and timeout
    ///
    /// # Errors
    /// Returns `InvalidConfig` if `host` is not a valid IPv4 address, host name or FQDN
    pub fn new(host: impl Into<String>) -> Result<Self> {
        let host = host.into();
        if !is_valid_host(&host) {
            return Err(AgentError::invalid_config(format!(
                "invalid server name or address [{host}]"
            )));
        }
        Ok(Self {
            host,
            port: DEFAULT_API_PORT,
            ignore_certificate: false,
            push_port: DEFAULT_PUSH_PORT,
            insecure_push: false,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    /// Set the API port
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Accept invalid certificates
    #[must_use]
    pub fn ignore_certificate(mut self, ignore: bool) -> Self {
        self.ignore_certificate = ignore;
        self
    }

    /// Set the push port and transport
    #[must_use]
    pub fn with_push(mut self, port: u16, insecure: bool) -> Self {
        self.push_port = port;
        self.insecure_push = insecure;
        self
    }

    /// Set the request timeout
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Base URL of the API, e.g. `https://host:8445/finesse/api`
    #[must_use]
    pub fn api_base(&self) -> String {
        if self.port == 443 {
            format!("https://{}{}", self.host, API_ROOT)
        } else {
            format!("https://{}:{}{}", self.host, self.port, API_ROOT)
        }
    }

    /// Full URL for a path below the API root
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            self.api_base()
        } else {
            format!("{}/{}", self.api_base(), path)
        }
    }

    /// Address of the push endpoint
    #[must_use]
    pub fn push_address(&self) -> String {
        if self.insecure_push {
            format!("{}:{}", self.host, self.push_port)
        } else {
            format!("wss://{}:{}/ws/", self.host, self.push_port)
        }
    }

    /// Domain of the server FQDN; `None` for IP addresses and bare host names
    #[must_use]
    pub fn domain(&self) -> Option<String> {
        if self.host.parse::<Ipv4Addr>().is_ok() {
            return None;
        }
        match self.host.split_once('.') {
            Some((_, domain)) if !domain.is_empty() => Some(domain.to_string()),
            _ => None,
        }
    }
}

/// Whether `host` is an IPv4 address, a host name or an FQDN
#[must_use]
pub fn is_valid_host(host: &str) -> bool {
    if host.parse::<Ipv4Addr>().is_ok() {
        return true;
    }
    // dotted quads that failed to parse are bad addresses, not names
    let all_numeric = host
        .split('.')
        .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()));
    if all_numeric && host.split('.').count() == 4 {
        return false;
    }
    !host.is_empty()
        && host.split('.').all(|label| {
            !label.is_empty()
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
                && !label.starts_with('-')
                && !label.ends_with('-')
        })
}
