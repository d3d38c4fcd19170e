//! Newtype wrappers for type safety
//!
//! This module contains newtype wrappers that provide type safety by wrapping
//! primitive types (like String) into distinct types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Newtype Wrappers for Type Safety
// ============================================================================

/// Length of generated request ids
const REQUEST_ID_LEN: usize = 10;

/// Durable agent id assigned by the platform (the `loginId` field)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoginId(String);

impl LoginId {
    /// Create a new login id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the login id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LoginId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for LoginId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for LoginId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Correlation id attached to one request (`RequestId` header)
///
/// Ids are generated per call from a fresh v4 UUID, so no generator state is
/// shared between requests or threads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Create a request id from an existing value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a short collision-resistant request id
    #[must_use]
    pub fn generate() -> Self {
        let mut id = Uuid::new_v4().simple().to_string();
        id.truncate(REQUEST_ID_LEN);
        Self(id)
    }

    /// Get the request id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
