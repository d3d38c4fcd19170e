//! # Finesse Agent Presence for Rust
//!
//! Push-confirmed presence control for contact-center agents. A state change
//! is only reported as done once the platform's push channel confirms it, and
//! the same change can be driven across thousands of agents at once without
//! one agent's failure touching another's result.
//!
//! ## Quick Start
//!
//! ```no_run
//! # #[cfg(feature = "http")]
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use kodegen_finesse_agent::{
//!     AgentIdentity, BulkGroup, HttpTransport, MemoryPushSource, ServerConfig,
//!     SessionOptions, TransitionOptions,
//! };
//!
//! let server = ServerConfig::new("finesse1.cc.example.com")?;
//! let options = SessionOptions::builder()
//!     .default_domain(server.domain())
//!     .build();
//! let transport = std::sync::Arc::new(HttpTransport::new(server)?);
//! let push = MemoryPushSource::new();
//!
//! let group = BulkGroup::new(options)?;
//! let identities = vec![
//!     AgentIdentity::new("agent01", "secret", "1001"),
//!     AgentIdentity::new("agent02", "secret", "1002"),
//! ];
//! group.add_bulk(identities, transport, push).await;
//!
//! for outcome in group.ready(TransitionOptions::forced()).await {
//!     log::info!("{}", outcome);
//! }
//! group.cancel();
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`types`]: identities, presence states, options and outcomes
//! - [`message`]: request bodies, notification envelopes and classification
//! - [`transport`]: the request/response [`Transport`] trait and server config
//! - [`notify`]: the [`PushSubscriber`] trait, mailboxes and the listener task
//! - [`session`]: [`AgentSession`], the guarded two-phase state machine
//! - [`group`]: [`BulkGroup`], the per-agent fan-out engine
//! - [`error`]: error types and handling
//!
//! ## Feature Flags
//!
//! - `http` - Enables the reqwest-based [`HttpTransport`]
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T, AgentError>`](Result). Group
//! operations never fail as a whole; they return one [`OperationOutcome`] per
//! agent, tagged by [`OutcomeKind`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod group;
pub mod message;
pub mod notify;
pub mod session;
pub mod transport;
pub mod types;

// Re-export commonly used types for external API
pub use error::{AgentError, Result};
pub use group::BulkGroup;
pub use message::{StateChangeRequest, UserStatus};
pub use notify::{MemoryPushSource, PushEvent, PushStream, PushSubscriber, SubscriptionKey};
pub use session::{AgentSession, StatusSnapshot};
pub use transport::{ApiRequest, ApiResponse, Method, ServerConfig, Transport};

#[cfg(feature = "http")]
pub use transport::HttpTransport;

// Re-export type submodules for flat public API
pub use types::agent::AgentIdentity;
pub use types::identifiers::{LoginId, RequestId};
pub use types::options::{SessionOptions, SessionOptionsBuilder, TransitionOptions};
pub use types::outcome::{GroupReport, Operation, OperationOutcome, OutcomeKind};
pub use types::presence::PresenceState;

/// Version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
