//! # Teleop Module
//!
//! Joystick to Rovio command mapping.
//!
//! This module handles:
//! - Joystick event and command message types
//! - Scaling configured axes into a planar velocity command
//! - Choosing a head position from configured buttons, in priority order
//! - Driving the outbound endpoints once per event

pub mod mapper;
pub mod messages;
pub mod node;
