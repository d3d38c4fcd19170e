//! Type definitions for the Finesse agent presence engine
//!
//! This module contains the type definitions used throughout the crate,
//! organized into logical submodules:
//!
//! - [`identifiers`] - Type-safe ID wrappers (`LoginId`, `RequestId`)
//! - [`agent`] - Agent login identity
//! - [`presence`] - Presence states and their static classifications
//! - [`options`] - Session options and per-call transition options
//! - [`outcome`] - Operations, per-agent outcomes and group reports

pub mod agent;
pub mod identifiers;
pub mod options;
pub mod outcome;
pub mod presence;

// Re-export commonly used types
pub use agent::AgentIdentity;
pub use identifiers::{LoginId, RequestId};
pub use options::{SessionOptions, SessionOptionsBuilder, TransitionOptions};
pub use outcome::{GroupReport, Operation, OperationOutcome, OutcomeKind};
pub use presence::PresenceState;
