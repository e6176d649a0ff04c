//! # Input Mapper Module
//!
//! Maps joystick events to velocity commands and head-position requests.
//!
//! ## Default Layout
//!
//! | Input | Index | Output | Scale |
//! |-------|-------|--------|-------|
//! | Axis | 1 | `linear.x` (forward) | 1.0 |
//! | Axis | 0 | `linear.y` (right) | -1.0 |
//! | Axis | 2 | `angular.z` (turn right) | -1.0 |
//! | Button | 1 | Head DOWN | - |
//! | Button | 2 | Head MID | - |
//! | Button | 3 | Head UP | - |
//!
//! Head buttons are checked in the order above and only the first pressed
//! one produces a request.
//!
//! ## Usage
//!
//! ```
//! use rovio_teleop::config::TeleopConfig;
//! use rovio_teleop::teleop::mapper::InputMapper;
//! use rovio_teleop::teleop::messages::{HeadPosition, JoyEvent};
//!
//! let mapper = InputMapper::new(TeleopConfig::default());
//! let event = JoyEvent::new(vec![0.0, 1.0, 0.0], vec![0, 0, 1, 1]);
//!
//! let cmd = mapper.map_velocity(&event)?;
//! assert_eq!(cmd.linear.x, 1.0);
//! assert_eq!(mapper.head_request(&event)?, Some(HeadPosition::Mid));
//! # Ok::<(), rovio_teleop::error::TeleopError>(())
//! ```

use super::messages::{HeadPosition, JoyEvent, Twist};
use crate::config::TeleopConfig;
use crate::error::{Result, TeleopError};

/// A button bound to a head position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadBinding {
    /// Parameter the index came from, for error reporting.
    pub param: &'static str,
    /// Index into [`JoyEvent::buttons`].
    pub button: usize,
    /// Position requested when the button is pressed.
    pub position: HeadPosition,
}

/// Stateless mapping from joystick events to robot commands.
///
/// Holds only the immutable configuration; every call builds a fresh
/// output value.
#[derive(Debug, Clone)]
pub struct InputMapper {
    config: TeleopConfig,
    /// Evaluated front to back, first pressed wins.
    head_bindings: [HeadBinding; 3],
}

impl Default for InputMapper {
    fn default() -> Self {
        Self::new(TeleopConfig::default())
    }
}

impl InputMapper {
    /// Creates a mapper from the teleop parameters.
    #[must_use]
    pub fn new(config: TeleopConfig) -> Self {
        let head_bindings = [
            HeadBinding {
                param: "button_head_down",
                button: config.button_head_down,
                position: HeadPosition::Down,
            },
            HeadBinding {
                param: "button_head_mid",
                button: config.button_head_mid,
                position: HeadPosition::Mid,
            },
            HeadBinding {
                param: "button_head_up",
                button: config.button_head_up,
                position: HeadPosition::Up,
            },
        ];

        Self {
            config,
            head_bindings,
        }
    }

    /// Returns the parameters this mapper was built from.
    #[must_use]
    pub fn config(&self) -> &TeleopConfig {
        &self.config
    }

    /// Returns the head bindings in priority order.
    #[must_use]
    pub fn head_bindings(&self) -> &[HeadBinding] {
        &self.head_bindings
    }

    /// Computes the velocity command for an event.
    ///
    /// # Errors
    ///
    /// Returns [`TeleopError::AxisIndexOutOfRange`] if a configured axis
    /// index is not present in `event.axes`.
    pub fn map_velocity(&self, event: &JoyEvent) -> Result<Twist> {
        let linear_x = self.scaled_axis(
            event,
            "axis_linearx",
            self.config.axis_linearx,
            self.config.scale_linearx,
        )?;
        let linear_y = self.scaled_axis(
            event,
            "axis_lineary",
            self.config.axis_lineary,
            self.config.scale_lineary,
        )?;
        let angular_z = self.scaled_axis(
            event,
            "axis_angular",
            self.config.axis_angular,
            self.config.scale_angular,
        )?;

        Ok(Twist::planar(linear_x, linear_y, angular_z))
    }

    /// Picks the head position requested by an event, if any.
    ///
    /// # Errors
    ///
    /// Returns [`TeleopError::ButtonIndexOutOfRange`] for the first binding
    /// whose index is missing from `event.buttons`, provided no earlier
    /// binding matched.
    pub fn head_request(&self, event: &JoyEvent) -> Result<Option<HeadPosition>> {
        // TODO: emergency stop has no binding yet; it needs a product decision
        // on which button and what the robot should do.
        for binding in &self.head_bindings {
            let value = event.buttons.get(binding.button).ok_or(
                TeleopError::ButtonIndexOutOfRange {
                    param: binding.param,
                    index: binding.button,
                    len: event.buttons.len(),
                },
            )?;

            if *value == 1 {
                return Ok(Some(binding.position));
            }
        }

        Ok(None)
    }

    /// Reads one axis and applies its scale.
    #[inline]
    fn scaled_axis(
        &self,
        event: &JoyEvent,
        param: &'static str,
        index: usize,
        scale: f64,
    ) -> Result<f64> {
        let raw = event
            .axes
            .get(index)
            .ok_or(TeleopError::AxisIndexOutOfRange {
                param,
                index,
                len: event.axes.len(),
            })?;

        Ok(f64::from(*raw) * scale)
    }
}
