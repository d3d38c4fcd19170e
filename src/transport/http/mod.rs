//! HTTP transport implementation using reqwest
//!
//! This module provides a transport implementation that talks to the
//! platform's REST API over HTTPS with basic authentication.

mod headers;
mod transport;

// Re-export public types
pub use headers::USER_AGENT;
pub use transport::HttpTransport;
