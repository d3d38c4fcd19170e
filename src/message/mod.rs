//! Wire messages: request bodies, notification envelopes and payloads

pub mod envelope;
pub mod parser;
pub mod request;
pub mod status;

pub use envelope::{Notification, PayloadKind, UpdateData, UpdateEnvelope, sniff_kind};
pub use parser::{Confirmation, classify, classify_response, parse_user_status};
pub use request::StateChangeRequest;
pub use status::{ApiError, ApiErrors, ReasonCode, UserStatus};
