//! # Error Types
//!
//! Custom error types for Rovio Teleop using `thiserror`.

use thiserror::Error;

/// Failure of a head-position request/response call.
#[derive(Debug, Error)]
pub enum CallError {
    /// No responder is reachable for the named service
    #[error("service {0} is not available")]
    Unavailable(String),

    /// Transport failure while talking to the responder
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The responder answered with something that is not a status
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Main error type for Rovio Teleop
#[derive(Debug, Error)]
pub enum TeleopError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Message encoding/decoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A configured axis index does not exist in the received event
    #[error("Configuration error: {param} = {index} but the event only has {len} axes")]
    AxisIndexOutOfRange {
        param: &'static str,
        index: usize,
        len: usize,
    },

    /// A configured button index does not exist in the received event
    #[error("Configuration error: {param} = {index} but the event only has {len} buttons")]
    ButtonIndexOutOfRange {
        param: &'static str,
        index: usize,
        len: usize,
    },

    /// Head-position call failed
    #[error(transparent)]
    HeadCall(#[from] CallError),
}

/// Result type alias for Rovio Teleop
pub type Result<T> = std::result::Result<T, TeleopError>;
