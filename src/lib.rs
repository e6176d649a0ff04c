//! # Rovio Teleop Library
//!
//! Drive a WowWee Rovio from a joystick.
//!
//! This library maps joystick events to planar velocity commands and
//! discrete head-position requests, and provides the endpoints that hand
//! them to the host middleware.

pub mod config;
pub mod error;
pub mod teleop;
pub mod transport;
