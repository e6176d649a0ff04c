//! # Teleop Message Types
//!
//! Inbound joystick events and outbound commands exchanged with the host
//! middleware.
//!
//! ## Frame Convention
//!
//! [`Twist`] uses a right handed frame:
//!
//! | Axis | Positive direction |
//! |------|--------------------|
//! | X | Forward |
//! | Y | Right |
//! | Z | Down |
//! | Rotation about Z | Turn right (clockwise seen from above) |

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single joystick sample as delivered by the joystick driver.
///
/// Axis values are usually in `-1.0..=1.0`. Buttons are `0` (released) or
/// `1` (pressed).
///
/// # Examples
///
/// ```
/// use rovio_teleop::teleop::messages::JoyEvent;
///
/// let event = JoyEvent::new(vec![0.5, 0.8, -0.3], vec![0, 1, 0, 0]);
/// assert_eq!(event.axes.len(), 3);
/// assert!(event.is_pressed(1));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JoyEvent {
    #[serde(default)]
    pub axes: Vec<f32>,

    #[serde(default)]
    pub buttons: Vec<i32>,
}

impl JoyEvent {
    /// Creates an event from raw axis and button arrays.
    #[must_use]
    pub fn new(axes: Vec<f32>, buttons: Vec<i32>) -> Self {
        Self { axes, buttons }
    }

    /// Returns `true` if the button at `index` exists and reads exactly 1.
    #[must_use]
    pub fn is_pressed(&self, index: usize) -> bool {
        self.buttons.get(index) == Some(&1)
    }
}

/// Three component vector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Planar velocity command.
///
/// Only `linear.x`, `linear.y` and `angular.z` ever carry a value; the other
/// components stay at zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Twist {
    pub linear: Vector3,
    pub angular: Vector3,
}

impl Twist {
    /// Builds a command from the three driven components.
    ///
    /// # Examples
    ///
    /// ```
    /// use rovio_teleop::teleop::messages::Twist;
    ///
    /// let cmd = Twist::planar(0.8, -0.5, 0.3);
    /// assert_eq!(cmd.linear.z, 0.0);
    /// assert_eq!(cmd.angular.x, 0.0);
    /// assert_eq!(cmd.angular.z, 0.3);
    /// ```
    #[must_use]
    pub fn planar(linear_x: f64, linear_y: f64, angular_z: f64) -> Self {
        Self {
            linear: Vector3 { x: linear_x, y: linear_y, z: 0.0 },
            angular: Vector3 { x: 0.0, y: 0.0, z: angular_z },
        }
    }
}

/// Fixed head (camera mast) positions of the Rovio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HeadPosition {
    Down,
    Mid,
    Up,
}

impl fmt::Display for HeadPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HeadPosition::Down => "DOWN",
            HeadPosition::Mid => "MID",
            HeadPosition::Up => "UP",
        };
        f.write_str(name)
    }
}

/// Status code returned by the head-position service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeadStatus(pub i32);

impl fmt::Display for HeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_pressed_requires_exactly_one() {
        let event = JoyEvent::new(vec![], vec![0, 1, 2, -1]);
        assert!(!event.is_pressed(0));
        assert!(event.is_pressed(1));
        assert!(!event.is_pressed(2));
        assert!(!event.is_pressed(3));
        assert!(!event.is_pressed(4));
    }

    #[test]
    fn test_twist_default_is_zero() {
        let cmd = Twist::default();
        assert_eq!(cmd, Twist::planar(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_joy_event_missing_fields_default_empty() {
        let event: JoyEvent = serde_json::from_str(r#"{"axes":[0.25]}"#).unwrap();
        assert_eq!(event.axes, vec![0.25]);
        assert!(event.buttons.is_empty());
    }

    #[test]
    fn test_head_position_wire_names() {
        assert_eq!(serde_json::to_string(&HeadPosition::Down).unwrap(), r#""DOWN""#);
        assert_eq!(serde_json::to_string(&HeadPosition::Mid).unwrap(), r#""MID""#);
        assert_eq!(serde_json::to_string(&HeadPosition::Up).unwrap(), r#""UP""#);
        assert_eq!(HeadPosition::Mid.to_string(), "MID");
    }

    #[test]
    fn test_twist_json_shape() {
        let value = serde_json::to_value(Twist::planar(1.0, 2.0, 3.0)).unwrap();
        assert_eq!(value["linear"]["x"], 1.0);
        assert_eq!(value["linear"]["y"], 2.0);
        assert_eq!(value["linear"]["z"], 0.0);
        assert_eq!(value["angular"]["z"], 3.0);
    }

    #[test]
    fn test_head_status_is_bare_integer() {
        let status: HeadStatus = serde_json::from_str("7").unwrap();
        assert_eq!(status, HeadStatus(7));
        assert_eq!(status.to_string(), "7");
    }
}
