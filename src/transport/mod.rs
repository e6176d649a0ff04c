//! # Transport Module
//!
//! Endpoints between the teleop node and the host middleware.
//!
//! This module handles:
//! - The publisher and head client seams the node is written against
//! - JSON lines framing for joystick input and velocity output
//! - Head-position request/response clients

pub mod head_client;
pub mod jsonl;
pub mod traits;
